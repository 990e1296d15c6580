use std::sync::Arc;

use serde_json::{json, Value};
use tracing::info;

/// The page's global tagging function, `(command, target_id, params)`.
pub trait AnalyticsSink: Send + Sync {
    fn tag(&self, command: &str, target_id: &str, params: &Value);
}

/// Sink that records tags in the application log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl AnalyticsSink for TracingSink {
    fn tag(&self, command: &str, target_id: &str, params: &Value) {
        info!(command, target_id, %params, "analytics: tag");
    }
}

/// Optional analytics capability. Every call checks for a sink first and
/// is a no-op without one; the return value says whether a tag was sent.
#[derive(Clone, Default)]
pub struct Analytics {
    sink: Option<Arc<dyn AnalyticsSink>>,
    measurement_id: String,
}

impl Analytics {
    pub fn new(sink: Option<Arc<dyn AnalyticsSink>>, measurement_id: impl Into<String>) -> Self {
        Self {
            sink,
            measurement_id: measurement_id.into(),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_available(&self) -> bool {
        self.sink.is_some()
    }

    fn send(&self, command: &str, target_id: &str, params: Value) -> bool {
        match &self.sink {
            Some(sink) => {
                sink.tag(command, target_id, &params);
                true
            }
            None => false,
        }
    }

    pub fn page_view(&self, path: &str) -> bool {
        self.send("config", &self.measurement_id, json!({ "page_path": path }))
    }

    pub fn event(&self, name: &str, params: Value) -> bool {
        self.send("event", name, params)
    }

    pub fn consent_update(&self, granted: bool) -> bool {
        let state = if granted { "granted" } else { "denied" };
        self.send("consent", "update", json!({ "analytics_storage": state }))
    }
}

#[cfg(test)]
#[path = "tests/analytics_tests.rs"]
mod tests;
