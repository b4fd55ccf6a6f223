use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use gamesearch_backend::{
    AppState,
    cache::SearchCache,
    catalog::PgCatalog,
    config::Config,
    gateway::SearchGateway,
    middleware::RateLimiter,
    router::build_router,
    upstream::GameApiClient,
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    // 显式构造网关的全部协作者并注入，不用进程级单例
    let catalog = Arc::new(PgCatalog::new(pool.clone()));
    let upstream = GameApiClient::new(&config).expect("Failed to build upstream client");
    let gateway = Arc::new(SearchGateway::new(
        catalog.clone(),
        Arc::new(upstream),
        SearchCache::new(config.cache_ttl()),
    ));

    // 登录限流器
    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit_window(),
        config.rate_limit_attempts,
    ));

    let state = AppState {
        pool,
        config: config.clone(),
        gateway,
        catalog,
    };

    let app = build_router(state, limiter);

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
