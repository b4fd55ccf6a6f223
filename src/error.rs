use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::gateway::GatewayError;
use crate::upstream::UpstreamError;

/// 对外暴露的统一错误分类
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    Unauthorized(String),
    TooManyAttempts(u64),
    NotFound(String),
    Upstream(UpstreamError),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

// 网关失败在边界处分类：存储问题是内部错误，上游问题原样透出
impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Catalog(e) => {
                tracing::error!(error = %e, "catalog query failed");
                ApiError::Internal("目录查询失败".to_string())
            }
            GatewayError::Upstream(e) => ApiError::Upstream(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::TooManyAttempts(retry_after) => (
                StatusCode::TOO_MANY_REQUESTS,
                "登录尝试过于频繁".to_string(),
                Some(format!("请在{}秒后重试", retry_after)),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::Upstream(err) => (
                StatusCode::BAD_GATEWAY,
                "上游搜索服务出错".to_string(),
                Some(err.to_string()),
            ),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
        };

        let body = Json(ErrorBody { error, details });

        (status, body).into_response()
    }
}
