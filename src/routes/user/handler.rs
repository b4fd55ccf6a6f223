use axum::{
    extract::{Json, State},
    http::StatusCode,
};

use crate::{AppState, error::ApiError, utils::generate_token};

use super::model::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, User};

// 认证失败统一返回同一条消息，不暴露用户是否存在
const BAD_CREDENTIALS: &str = "标识或密码错误";

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let identifier = req.identifier.as_deref().map(str::trim).unwrap_or_default();
    let secret = req.secret.as_deref().unwrap_or_default();

    if identifier.is_empty() || secret.is_empty() {
        return Err(ApiError::Validation("标识和密码均为必填".to_string()));
    }
    if !identifier.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(ApiError::Validation(
            "标识格式无效，只允许使用字母、数字和下划线".to_string(),
        ));
    }
    if secret.len() < 6 || secret.len() > 24 {
        return Err(ApiError::Validation("密码长度必须在6到24个字符之间".to_string()));
    }

    match User::create(&state.pool, identifier, secret).await {
        Ok(user) => {
            tracing::info!(user_id = %user.user_id, "user registered");
            Ok((
                StatusCode::CREATED,
                Json(RegisterResponse {
                    message: "注册成功".to_string(),
                }),
            ))
        }
        Err(e) => {
            if e.as_database_error().is_some_and(|db| db.is_unique_violation()) {
                tracing::warn!(identifier, "duplicate identifier on register");
                Err(ApiError::Internal("该标识已被注册".to_string()))
            } else {
                tracing::error!(error = %e, "failed to register user");
                Err(ApiError::Internal("注册失败".to_string()))
            }
        }
    }
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let identifier = req.identifier.as_deref().map(str::trim).unwrap_or_default();
    let secret = req.secret.as_deref().unwrap_or_default();

    if identifier.is_empty() || secret.is_empty() {
        return Err(ApiError::Validation("标识和密码均为必填".to_string()));
    }

    let user = User::find_by_id(&state.pool, identifier).await.map_err(|e| {
        tracing::error!(error = %e, "failed to look up user");
        ApiError::Internal("登录失败".to_string())
    })?;

    let Some(user) = user else {
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
    };

    match user.verify_login(secret) {
        Ok(true) => {}
        Ok(false) => return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string())),
        Err(e) => {
            tracing::error!(error = %e, "password verification failed");
            return Err(ApiError::Internal("登录失败".to_string()));
        }
    }

    let token = generate_token(&user.user_id, &state.config).map_err(|e| {
        tracing::error!(error = %e, "failed to issue token");
        ApiError::Internal("生成令牌失败".to_string())
    })?;

    Ok(Json(LoginResponse { token }))
}
