use std::sync::Arc;

use sqlx::PgPool;

use catalog::CatalogStore;
use config::Config;
use gateway::SearchGateway;

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod gateway;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod upstream;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub gateway: Arc<SearchGateway>,
    pub catalog: Arc<dyn CatalogStore>,
}
