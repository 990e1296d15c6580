use std::{collections::HashMap, fs, time::Duration};

use content::{
    provider::{DEFAULT_API_URL, DEFAULT_API_VERSION},
    CollectionIds, ProviderSettings,
};
use shared::protocol::ConfigurationFlags;

const SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_bind: String,
    pub content_api_url: String,
    pub content_api_key: Option<String>,
    pub content_api_version: String,
    pub events_database_id: Option<String>,
    pub menu_database_id: Option<String>,
    pub news_database_id: Option<String>,
    pub page_id: Option<String>,
    pub request_timeout_secs: u64,
    pub allowed_origin: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8080".into(),
            content_api_url: DEFAULT_API_URL.into(),
            content_api_key: None,
            content_api_version: DEFAULT_API_VERSION.into(),
            events_database_id: None,
            menu_database_id: None,
            news_database_id: None,
            page_id: None,
            request_timeout_secs: 10,
            allowed_origin: None,
        }
    }
}

impl Settings {
    pub fn configuration_flags(&self) -> ConfigurationFlags {
        ConfigurationFlags {
            has_api_key: present(&self.content_api_key),
            has_events_database_id: present(&self.events_database_id),
            has_menu_database_id: present(&self.menu_database_id),
            has_news_database_id: present(&self.news_database_id),
            has_page_id: present(&self.page_id),
        }
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            api_url: self.content_api_url.clone(),
            api_key: self.content_api_key.clone(),
            api_version: self.content_api_version.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn collection_ids(&self) -> CollectionIds {
        CollectionIds {
            events: self.events_database_id.clone(),
            menu: self.menu_database_id.clone(),
            news: self.news_database_id.clone(),
        }
    }
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Defaults, then `server.toml` in the working directory, then environment
/// variables. Nothing here fails: missing values surface later through the
/// configuration flags.
pub fn load_settings() -> Settings {
    let file_cfg = fs::read_to_string(SETTINGS_FILE)
        .ok()
        .and_then(|raw| toml::from_str::<HashMap<String, toml::Value>>(&raw).ok())
        .unwrap_or_default();
    resolve_settings(&file_cfg, |name| std::env::var(name).ok())
}

pub(crate) fn resolve_settings(
    file_cfg: &HashMap<String, toml::Value>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    let file_value = |key: &str| -> Option<String> {
        match file_cfg.get(key)? {
            toml::Value::String(v) => Some(v.clone()),
            toml::Value::Integer(v) => Some(v.to_string()),
            _ => None,
        }
    };
    // Later names win: file key, plain env name, then the APP__ form.
    let lookup = |file_key: &str, env_names: &[&str]| -> Option<String> {
        env_names
            .iter()
            .rev()
            .find_map(|name| env(name))
            .or_else(|| file_value(file_key))
    };

    if let Some(v) = lookup("bind_addr", &["SERVER_BIND", "APP__BIND_ADDR"]) {
        settings.server_bind = v;
    }
    if let Some(v) = lookup("content_api_url", &["CONTENT_API_URL", "APP__CONTENT_API_URL"]) {
        settings.content_api_url = v;
    }
    if let Some(v) = lookup(
        "content_api_version",
        &["CONTENT_API_VERSION", "APP__CONTENT_API_VERSION"],
    ) {
        settings.content_api_version = v;
    }
    settings.content_api_key = lookup("content_api_key", &["CONTENT_API_KEY", "APP__CONTENT_API_KEY"])
        .and_then(non_blank);
    settings.events_database_id = lookup(
        "events_database_id",
        &["CONTENT_EVENTS_DATABASE_ID", "APP__EVENTS_DATABASE_ID"],
    )
    .and_then(non_blank);
    settings.menu_database_id = lookup(
        "menu_database_id",
        &["CONTENT_MENU_DATABASE_ID", "APP__MENU_DATABASE_ID"],
    )
    .and_then(non_blank);
    settings.news_database_id = lookup(
        "news_database_id",
        &["CONTENT_NEWS_DATABASE_ID", "APP__NEWS_DATABASE_ID"],
    )
    .and_then(non_blank);
    settings.page_id = lookup("page_id", &["CONTENT_PAGE_ID", "APP__PAGE_ID"]).and_then(non_blank);
    settings.allowed_origin =
        lookup("allowed_origin", &["ALLOWED_ORIGIN", "APP__ALLOWED_ORIGIN"]).and_then(non_blank);

    if let Some(v) = lookup(
        "request_timeout_secs",
        &["CONTENT_REQUEST_TIMEOUT_SECS", "APP__REQUEST_TIMEOUT_SECS"],
    ) {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    settings
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
