use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message surfaced when a failure carries no text of its own.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Presence of each external configuration value. Booleans only: secret
/// values never leave the process through a response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationFlags {
    pub has_api_key: bool,
    pub has_events_database_id: bool,
    pub has_menu_database_id: bool,
    pub has_news_database_id: bool,
    pub has_page_id: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    #[serde(flatten)]
    pub flags: ConfigurationFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_count: Option<usize>,
    pub timestamp: DateTime<Utc>,
}

impl DebugInfo {
    pub fn new(flags: ConfigurationFlags, data_count: Option<usize>) -> Self {
        Self {
            flags,
            data_count,
            timestamp: Utc::now(),
        }
    }
}

/// Uniform body of every content endpoint. Built through [`ContentEnvelope::ok`]
/// or [`ContentEnvelope::failed`] so that exactly one of `data` and `error`
/// is populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<T>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub debug: DebugInfo,
}

impl<T> ContentEnvelope<T> {
    pub fn ok(data: Vec<T>, flags: ConfigurationFlags) -> Self {
        let debug = DebugInfo::new(flags, Some(data.len()));
        Self {
            success: true,
            data: Some(data),
            error: None,
            debug,
        }
    }

    pub fn failed(message: impl Into<String>, flags: ConfigurationFlags) -> Self {
        let message = message.into();
        let error = if message.trim().is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            message
        };
        Self {
            success: false,
            data: None,
            error: Some(error),
            debug: DebugInfo::new(flags, None),
        }
    }
}

/// Body of the configuration diagnostic route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigStatus {
    pub success: bool,
    pub debug: DebugInfo,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
