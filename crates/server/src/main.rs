use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use content::{provider::key_prefix, ContentNormalizer, HttpContentProvider};
use server::{app_state::AppState, build_router, config::load_settings};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings();
    let flags = settings.configuration_flags();
    info!(
        has_api_key = flags.has_api_key,
        api_key = %settings.content_api_key.as_deref().map(key_prefix).unwrap_or_default(),
        has_events_database_id = flags.has_events_database_id,
        has_menu_database_id = flags.has_menu_database_id,
        has_news_database_id = flags.has_news_database_id,
        has_page_id = flags.has_page_id,
        "content configuration loaded"
    );

    let provider = HttpContentProvider::new(settings.provider_settings())
        .context("failed to build content provider client")?;
    let state = AppState {
        normalizer: ContentNormalizer::new(Arc::new(provider), settings.collection_ids()),
        flags,
    };
    let app = build_router(Arc::new(state), settings.allowed_origin.as_deref());

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.server_bind))?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if signal::ctrl_c().await.is_ok() {
        info!("received Ctrl+C, shutting down");
    }
}
