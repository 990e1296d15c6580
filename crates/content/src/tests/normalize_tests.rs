use std::sync::Mutex;

use super::*;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;

struct FakeProvider {
    rows: Vec<serde_json::Value>,
    fail_with: Option<u16>,
    queried: Mutex<Vec<String>>,
}

impl FakeProvider {
    fn with_rows(rows: Vec<serde_json::Value>) -> Self {
        Self {
            rows,
            fail_with: None,
            queried: Mutex::new(Vec::new()),
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            rows: Vec::new(),
            fail_with: Some(status),
            queried: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ContentProvider for FakeProvider {
    async fn query_collection(
        &self,
        collection_id: &str,
    ) -> Result<Vec<RawContentRecord>, ContentFetchError> {
        self.queried
            .lock()
            .expect("lock")
            .push(collection_id.to_string());
        if let Some(status) = self.fail_with {
            return Err(ContentFetchError::Status {
                status,
                body: "provider unavailable".into(),
            });
        }
        Ok(self
            .rows
            .iter()
            .map(|row| serde_json::from_value(row.clone()).expect("row"))
            .collect())
    }
}

fn collections() -> CollectionIds {
    CollectionIds {
        events: Some("events-db".into()),
        menu: Some("menu-db".into()),
        news: Some("news-db".into()),
    }
}

fn normalizer(provider: Arc<FakeProvider>) -> ContentNormalizer {
    ContentNormalizer::new(provider, collections())
}

fn titled(id: &str, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "properties": { "Name": { "type": "title", "title": [{ "plain_text": title }] } }
    })
}

#[tokio::test]
async fn every_row_survives_and_untitled_rows_get_empty_title() {
    let provider = Arc::new(FakeProvider::with_rows(vec![
        titled("m1", "Cappuccino"),
        json!({ "id": "m2", "properties": { "Price": { "type": "number", "number": 3.2 } } }),
        titled("m3", "Chai"),
    ]));
    let menu = normalizer(provider.clone()).fetch_menu().await.expect("menu");

    assert_eq!(menu.len(), 3);
    assert_eq!(menu[0].title, "Cappuccino");
    assert_eq!(menu[1].title, "");
    assert_eq!(menu[1].price, Some(3.2));
    assert_eq!(menu[2].title, "Chai");
    assert_eq!(*provider.queried.lock().expect("lock"), vec!["menu-db"]);
}

#[tokio::test]
async fn broken_property_blanks_only_that_field() {
    let provider = Arc::new(FakeProvider::with_rows(vec![
        titled("m1", "Cappuccino"),
        json!({ "id": "m2", "properties": {
            "Name": { "type": "title", "title": [{ "plain_text": "Cold brew" }] },
            "Category": { "type": "select", "select": { "id": "x" } },
            "Tags": { "multi_select": [{ "name": "iced" }] },
            "Price": { "type": "number", "number": 4.0 }
        } }),
    ]));
    let menu = normalizer(provider).fetch_menu().await.expect("menu");

    assert_eq!(menu.len(), 2);
    assert_eq!(menu[1].title, "Cold brew");
    assert_eq!(menu[1].category, None);
    assert!(menu[1].tags.is_empty());
    assert_eq!(menu[1].price, Some(4.0));
}

#[tokio::test]
async fn provider_order_is_preserved() {
    let provider = Arc::new(FakeProvider::with_rows(vec![
        json!({ "id": "n2", "properties": {
            "Title": { "type": "title", "title": [{ "plain_text": "Second" }] },
            "Date": { "type": "date", "date": { "start": "2025-01-01" } }
        } }),
        json!({ "id": "n1", "properties": {
            "Title": { "type": "title", "title": [{ "plain_text": "First" }] },
            "Date": { "type": "date", "date": { "start": "2025-06-01" } }
        } }),
    ]));
    let news = normalizer(provider).fetch_news().await.expect("news");
    let ids: Vec<&str> = news.iter().map(|article| article.id.as_str()).collect();
    assert_eq!(ids, vec!["n2", "n1"]);
}

#[tokio::test]
async fn missing_row_id_is_replaced_with_positional_id() {
    let provider = Arc::new(FakeProvider::with_rows(vec![
        titled("e1", "Open mic"),
        json!({ "properties": {} }),
    ]));
    let events = normalizer(provider).fetch_events().await.expect("events");
    assert_eq!(events[1].id.as_str(), "events-1");
    assert_eq!(events[1].title, "");
}

#[tokio::test]
async fn empty_collection_is_an_empty_list() {
    let provider = Arc::new(FakeProvider::with_rows(Vec::new()));
    let events = normalizer(provider).fetch_events().await.expect("events");
    assert!(events.is_empty());
}

#[tokio::test]
async fn provider_failure_is_a_content_fetch_error() {
    let provider = Arc::new(FakeProvider::failing(503));
    let err = normalizer(provider).fetch_menu().await.expect_err("should fail");
    assert!(matches!(err, ContentFetchError::Status { status: 503, .. }));
}

#[tokio::test]
async fn unconfigured_collection_fails_before_querying() {
    let provider = Arc::new(FakeProvider::with_rows(vec![titled("x", "X")]));
    let normalizer = ContentNormalizer::new(
        provider.clone(),
        CollectionIds {
            news: Some("   ".into()),
            ..collections()
        },
    );
    let err = normalizer.fetch_news().await.expect_err("should fail");
    assert!(matches!(
        err,
        ContentFetchError::ConfigurationMissing("CONTENT_NEWS_DATABASE_ID")
    ));
    assert!(provider.queried.lock().expect("lock").is_empty());
}

#[test]
fn event_rows_map_datetime_range_and_optional_fields() {
    let row: RawContentRecord = serde_json::from_value(json!({
        "id": "evt",
        "properties": {
            "Name": { "type": "title", "title": [{ "plain_text": "Latte art throwdown" }] },
            "Description": { "type": "rich_text", "rich_text": [{ "plain_text": "Bring your pitcher." }] },
            "Date": { "type": "date", "date": {
                "start": "2025-07-04T18:00:00.000-04:00",
                "end": "2025-07-04T21:30:00.000-04:00"
            } },
            "Location": { "type": "rich_text", "rich_text": [] }
        }
    }))
    .expect("row");

    let event = normalize_event(&row);
    assert_eq!(event.title, "Latte art throwdown");
    assert_eq!(event.description, "Bring your pitcher.");
    assert_eq!(event.date, NaiveDate::from_ymd_opt(2025, 7, 4));
    assert_eq!(event.start_time.as_deref(), Some("18:00"));
    assert_eq!(event.end_time.as_deref(), Some("21:30"));
    assert_eq!(event.location, None);
    assert_eq!(event.image_url, None);
}

#[test]
fn menu_rows_map_price_category_tags_and_availability() {
    let row: RawContentRecord = serde_json::from_value(json!({
        "id": "menu-1",
        "properties": {
            "Name": { "type": "title", "title": [{ "plain_text": "Oat Flat White" }] },
            "Price": { "type": "number", "number": 4.25 },
            "Category": { "type": "select", "select": { "name": "Coffee" } },
            "Tags": { "type": "multi_select", "multi_select": [{ "name": "vegan" }, { "name": "hot" }] },
            "Available": { "type": "checkbox", "checkbox": false }
        }
    }))
    .expect("row");

    let item = normalize_menu_item(&row);
    assert_eq!(item.price, Some(4.25));
    assert_eq!(item.category.as_deref(), Some("Coffee"));
    assert_eq!(item.tags, vec!["vegan", "hot"]);
    assert!(!item.available);
    assert_eq!(item.description, "");
}

#[test]
fn news_rows_keep_body_optional() {
    let row: RawContentRecord = serde_json::from_value(json!({
        "id": "news-1",
        "properties": {
            "Title": { "type": "title", "title": [{ "plain_text": "New roast" }] },
            "Summary": { "type": "rich_text", "rich_text": [{ "plain_text": "A washed Ethiopian." }] },
            "Category": { "type": "select", "select": { "name": "Roastery" } }
        }
    }))
    .expect("row");

    let article = normalize_news_article(&row);
    assert_eq!(article.summary, "A washed Ethiopian.");
    assert_eq!(article.category.as_deref(), Some("Roastery"));
    assert_eq!(article.body, None);
    assert_eq!(article.date, None);

    let value = serde_json::to_value(&article).expect("json");
    assert!(value.get("body").is_none());
}
