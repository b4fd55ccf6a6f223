use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::SearchCache;
use crate::catalog::{CatalogStore, Game};
use crate::upstream::{UpstreamError, UpstreamSearch};

/// 面向消费者的统一结果记录
///
/// 本地目录记录和远端记录都在各自边界投影成这个形态，
/// 下游不再需要区分平台字段的编码方式
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub name: String,
    pub platforms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl From<Game> for SearchResult {
    fn from(game: Game) -> Self {
        SearchResult {
            name: game.name,
            platforms: game.platforms,
            image_ref: Some(game.image_ref),
        }
    }
}

#[derive(Debug)]
pub enum GatewayError {
    Catalog(sqlx::Error),
    Upstream(UpstreamError),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Catalog(e) => write!(f, "目录查询失败: {}", e),
            GatewayError::Upstream(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for GatewayError {}

/// 搜索网关
///
/// 编排一次搜索：缓存命中直接返回，否则本地目录和上游各查一次，
/// 本地在前、上游在后拼接（两边各自保序，不去重），非空结果写回缓存。
/// 上游失败则整个操作失败，不降级为仅本地结果。
pub struct SearchGateway {
    catalog: Arc<dyn CatalogStore>,
    upstream: Arc<dyn UpstreamSearch>,
    cache: SearchCache,
}

impl SearchGateway {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        upstream: Arc<dyn UpstreamSearch>,
        cache: SearchCache,
    ) -> Self {
        Self {
            catalog,
            upstream,
            cache,
        }
    }

    /// `term` 必须已经过清理和修剪，同时充当缓存键
    pub async fn search(&self, term: &str) -> Result<Vec<SearchResult>, GatewayError> {
        if let Some(cached) = self.cache.get(term) {
            tracing::debug!(term, results = cached.len(), "search cache hit");
            return Ok(cached);
        }
        tracing::debug!(term, "search cache miss");

        let local = self
            .catalog
            .find_by_name_contains(term)
            .await
            .map_err(GatewayError::Catalog)?;

        let remote = self.upstream.search(term).await.map_err(|e| {
            tracing::error!(term, error = %e, "upstream search failed");
            GatewayError::Upstream(e)
        })?;

        let mut merged: Vec<SearchResult> = local.into_iter().map(SearchResult::from).collect();
        merged.extend(remote);

        // 空结果不落缓存，下次请求重新查询
        if !merged.is_empty() {
            self.cache.put(term.to_string(), merged.clone());
        }

        Ok(merged)
    }
}
