use axum::{
    Extension,
    extract::{Json, State},
    http::StatusCode,
};

use crate::{AppState, catalog::NewGame, error::ApiError, utils::Claims};

use super::model::{InsertGameRequest, InsertGameResponse};

#[axum::debug_handler]
pub async fn insert_game(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<InsertGameRequest>,
) -> Result<(StatusCode, Json<InsertGameResponse>), ApiError> {
    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    let image_ref = req.image_ref.as_deref().map(str::trim).unwrap_or_default();
    let platforms: Vec<String> = req
        .platforms
        .unwrap_or_default()
        .iter()
        .map(|p| p.trim().to_string())
        .collect();

    // 三个字段全部必填，平台列表不允许空串成员
    if name.is_empty()
        || image_ref.is_empty()
        || platforms.is_empty()
        || platforms.iter().any(|p| p.is_empty())
    {
        return Err(ApiError::Validation(
            "name、platforms、imageRef 均为必填".to_string(),
        ));
    }

    let record = state
        .catalog
        .insert(NewGame {
            name: name.to_string(),
            platforms,
            image_ref: image_ref.to_string(),
        })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to insert catalog record");
            ApiError::Internal("写入目录失败".to_string())
        })?;

    tracing::info!(user_id = %claims.sub, game_id = %record.game_id, "catalog record created");

    Ok((
        StatusCode::CREATED,
        Json(InsertGameResponse {
            message: "记录已创建".to_string(),
            record,
        }),
    ))
}
