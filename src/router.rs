use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};

use crate::{
    AppState,
    middleware::{RateLimiter, auth_middleware, log_errors, rate_limit},
    routes,
};

pub fn build_router(state: AppState, limiter: Arc<RateLimiter>) -> Router {
    // 限流只挂在登录入口，搜索不受影响
    let login_routes = Router::new()
        .route("/login", post(routes::user::login))
        .route_layer(from_fn_with_state(limiter, rate_limit));

    let public_routes = Router::new()
        .route("/register", post(routes::user::register))
        .merge(login_routes);

    let protected_routes = Router::new()
        .route("/search", get(routes::search::search))
        .route("/insert-record", post(routes::game::insert_game))
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    let router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(from_fn(log_errors));

    // 开发模式放开CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    router.with_state(state)
}
