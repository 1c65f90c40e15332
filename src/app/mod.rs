//! 应用层

pub mod products;

use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::HttpConfig;
use crate::core::middleware::request_logging_middleware;
use products::handler::{health_check, AppState};

/// 组装完整路由及中间件
pub fn build_router(state: AppState, http: &HttpConfig) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(products::routes())
        .layer(TimeoutLayer::new(Duration::from_secs(http.timeout_seconds)))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_logging_middleware))
        .with_state(state)
}
