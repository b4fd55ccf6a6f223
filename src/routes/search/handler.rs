use axum::{
    Extension,
    extract::{Json, Query, State},
};

use crate::{
    AppState,
    error::ApiError,
    gateway::SearchResult,
    utils::{Claims, sanitize_term},
};

use super::model::SearchQuery;

#[axum::debug_handler]
pub async fn search(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SearchResult>>, ApiError> {
    // 搜索词先清理再使用，清理后的值同时充当缓存键
    let term = sanitize_term(query.term.as_deref().unwrap_or_default());
    if term.is_empty() {
        return Err(ApiError::Validation("搜索词不能为空".to_string()));
    }

    tracing::info!(user_id = %claims.sub, %term, "search request");

    let results = state.gateway.search(&term).await?;

    // 本地目录与上游都为空才算没有结果
    if results.is_empty() {
        return Err(ApiError::NotFound("没有找到匹配的游戏".to_string()));
    }

    Ok(Json(results))
}
