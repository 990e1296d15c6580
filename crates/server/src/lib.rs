use std::sync::Arc;

use axum::{http::HeaderValue, routing::get, Router};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

pub mod api;
pub mod app_state;
pub mod config;

use api::{
    config_route, events_route, healthz, http_config, http_events, http_menu, http_news,
    menu_route, news_route, not_found,
};
use app_state::AppState;

pub fn build_router(state: Arc<AppState>, allowed_origin: Option<&str>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(events_route(), get(http_events))
        .route(menu_route(), get(http_menu))
        .route(news_route(), get(http_news))
        .route(config_route(), get(http_config))
        .fallback(not_found)
        .layer(cors_layer(allowed_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let origin = match allowed_origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => AllowOrigin::exact(origin),
        Some(Err(error)) => {
            warn!(%error, "invalid allowed origin, allowing any origin");
            AllowOrigin::from(Any)
        }
        None => AllowOrigin::from(Any),
    };
    CorsLayer::new()
        .allow_methods([axum::http::Method::GET])
        .allow_origin(origin)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
