use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use content::ContentFetchError;
use shared::{
    domain::{ContentKind, Event, MenuItem, NewsArticle},
    error::{ApiError, ErrorCode},
    protocol::{ConfigStatus, ConfigurationFlags, ContentEnvelope, DebugInfo},
};
use tracing::{error, info};

use crate::app_state::AppState;

pub fn events_route() -> &'static str {
    "/api/events"
}

pub fn menu_route() -> &'static str {
    "/api/menu"
}

pub fn news_route() -> &'static str {
    "/api/news"
}

pub fn config_route() -> &'static str {
    "/api/config"
}

type ContentResponse<T> = (StatusCode, Json<ContentEnvelope<T>>);

pub async fn http_events(State(state): State<Arc<AppState>>) -> ContentResponse<Event> {
    respond(
        ContentKind::Events,
        state.normalizer.fetch_events().await,
        state.flags,
    )
}

pub async fn http_menu(State(state): State<Arc<AppState>>) -> ContentResponse<MenuItem> {
    respond(ContentKind::Menu, state.normalizer.fetch_menu().await, state.flags)
}

pub async fn http_news(State(state): State<Arc<AppState>>) -> ContentResponse<NewsArticle> {
    respond(ContentKind::News, state.normalizer.fetch_news().await, state.flags)
}

pub async fn http_config(State(state): State<Arc<AppState>>) -> Json<ConfigStatus> {
    Json(ConfigStatus {
        success: true,
        debug: DebugInfo::new(state.flags, None),
    })
}

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn not_found() -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new(ErrorCode::NotFound, "no such route")),
    )
}

fn respond<T>(
    kind: ContentKind,
    result: Result<Vec<T>, ContentFetchError>,
    flags: ConfigurationFlags,
) -> ContentResponse<T> {
    match result {
        Ok(items) => {
            info!(%kind, count = items.len(), "api: content served");
            (StatusCode::OK, Json(ContentEnvelope::ok(items, flags)))
        }
        Err(err) => {
            error!(%kind, error = %err, ?flags, "api: content fetch failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ContentEnvelope::failed(err.to_string(), flags)),
            )
        }
    }
}
