use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use content::{catalog, ContentNormalizer, HttpContentProvider};
use serde::Serialize;
use serde_json::Value;
use server::config::{load_settings, Settings};
use shared::protocol::DebugInfo;
use tracing_subscriber::EnvFilter;

/// Query the café's content database with the server's settings.
#[derive(Parser, Debug)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List events in provider order, or only upcoming ones soonest first.
    Events {
        #[arg(long)]
        upcoming: bool,
    },
    /// List the menu grouped by category.
    Menu {
        #[arg(long)]
        category: Option<String>,
    },
    /// List news articles, newest first.
    News {
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        category: Option<String>,
    },
    /// Show which configuration values are present.
    Config,
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn normalizer(settings: &Settings) -> Result<ContentNormalizer> {
    let provider = HttpContentProvider::new(settings.provider_settings())
        .context("failed to build content provider client")?;
    Ok(ContentNormalizer::new(Arc::new(provider), settings.collection_ids()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let output = render(args.command, &load_settings()).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Runs one subcommand and returns the JSON it prints. Only the content
/// subcommands reach the provider.
async fn render(command: Command, settings: &Settings) -> Result<Value> {
    match command {
        Command::Config => to_json(&DebugInfo::new(settings.configuration_flags(), None)),
        Command::Events { upcoming } => {
            let events = normalizer(settings)?
                .fetch_events()
                .await
                .context("fetching events")?;
            if upcoming {
                to_json(&catalog::upcoming_events(&events, Local::now().date_naive()))
            } else {
                to_json(&events)
            }
        }
        Command::Menu { category } => {
            let menu = normalizer(settings)?
                .fetch_menu()
                .await
                .context("fetching menu")?;
            let mut groups = catalog::menu_by_category(&menu);
            if let Some(category) = category {
                groups.retain(|(name, _)| name.eq_ignore_ascii_case(&category));
            }
            to_json(&groups)
        }
        Command::News { limit, category } => {
            let news = normalizer(settings)?
                .fetch_news()
                .await
                .context("fetching news")?;
            let news = match category {
                Some(category) => catalog::news_in_category(&news, &category),
                None => news,
            };
            to_json(&catalog::latest_news(&news, limit))
        }
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
