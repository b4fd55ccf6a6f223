use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::{AppState, error::ApiError, utils::verify_token};

/// 受保护路由的认证中间件：校验 Bearer 令牌，
/// 通过后把 Claims 注入请求扩展供 handler 使用
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "));

    let Some(token) = token else {
        return Err(ApiError::Unauthorized("缺少访问令牌".to_string()));
    };

    match verify_token(token, &state.config) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(e) => {
            // 过期、签名错误、格式错误一律按未授权处理
            tracing::debug!(error = %e, "token verification failed");
            Err(ApiError::Unauthorized("令牌无效或已过期".to_string()))
        }
    }
}
