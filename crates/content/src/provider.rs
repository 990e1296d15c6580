use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::{error::ContentFetchError, raw::RawContentRecord};

pub const DEFAULT_API_URL: &str = "https://api.notion.com";
pub const DEFAULT_API_VERSION: &str = "2022-06-28";
pub const API_KEY_SETTING: &str = "CONTENT_API_KEY";

const PAGE_SIZE: u32 = 100;
const KEY_PREFIX_LEN: usize = 4;
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Source of raw rows for a named collection.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn query_collection(
        &self,
        collection_id: &str,
    ) -> Result<Vec<RawContentRecord>, ContentFetchError>;
}

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_url: String,
    pub api_key: Option<String>,
    pub api_version: String,
    pub request_timeout: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            api_key: None,
            api_version: DEFAULT_API_VERSION.into(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Loggable form of a credential: the first few characters only.
pub fn key_prefix(key: &str) -> String {
    let prefix: String = key.chars().take(KEY_PREFIX_LEN).collect();
    format!("{prefix}…")
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_cursor: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

/// Database-query client for the hosted content provider.
#[derive(Clone)]
pub struct HttpContentProvider {
    http: Client,
    api_url: Url,
    api_key: Option<String>,
    api_version: String,
}

impl HttpContentProvider {
    pub fn new(settings: ProviderSettings) -> Result<Self, ContentFetchError> {
        let mut api_url = Url::parse(&settings.api_url)?;
        if !api_url.path().ends_with('/') {
            let path = format!("{}/", api_url.path());
            api_url.set_path(&path);
        }
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        let api_key = settings.api_key.filter(|key| !key.trim().is_empty());
        if let Some(key) = &api_key {
            info!(api_key = %key_prefix(key), %api_url, "content provider configured");
        } else {
            info!(%api_url, "content provider configured without an api key");
        }
        Ok(Self {
            http,
            api_url,
            api_key,
            api_version: settings.api_version,
        })
    }

    fn query_url(&self, collection_id: &str) -> Result<Url, ContentFetchError> {
        Ok(self
            .api_url
            .join(&format!("v1/databases/{collection_id}/query"))?)
    }

    async fn query_page(
        &self,
        url: &Url,
        api_key: &str,
        cursor: Option<&str>,
    ) -> Result<QueryResponse, ContentFetchError> {
        let response = self
            .http
            .post(url.clone())
            .bearer_auth(api_key)
            .header("Notion-Version", &self.api_version)
            .header(header::ACCEPT, "application/json")
            .json(&QueryRequest {
                page_size: PAGE_SIZE,
                start_cursor: cursor,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ContentFetchError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// A row that cannot be read at all is kept as an empty record, so the
/// page still has one entry per provider row.
fn decode_row(row: Value) -> RawContentRecord {
    serde_json::from_value(row).unwrap_or_else(|error| {
        warn!(%error, "content: provider row could not be decoded, keeping it blank");
        RawContentRecord::default()
    })
}

#[async_trait]
impl ContentProvider for HttpContentProvider {
    async fn query_collection(
        &self,
        collection_id: &str,
    ) -> Result<Vec<RawContentRecord>, ContentFetchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ContentFetchError::ConfigurationMissing(API_KEY_SETTING))?;
        let url = self.query_url(collection_id)?;

        let mut records = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self.query_page(&url, api_key, cursor.as_deref()).await?;
            debug!(
                collection_id,
                page_rows = page.results.len(),
                has_more = page.has_more,
                "content: provider page received"
            );
            records.extend(page.results.into_iter().map(decode_row));
            match page.next_cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => break,
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
#[path = "tests/provider_tests.rs"]
mod tests;
