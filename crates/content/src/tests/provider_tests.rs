use std::sync::Arc;

use super::*;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct ProviderState {
    seen: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
}

fn row(id: &str, title: &str) -> Value {
    json!({
        "object": "page",
        "id": id,
        "properties": {
            "Name": { "type": "title", "title": [{ "plain_text": title }] }
        }
    })
}

async fn handle_query(
    State(state): State<ProviderState>,
    Path(collection_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    state
        .seen
        .lock()
        .await
        .push((collection_id.clone(), auth.clone(), body.clone()));

    if auth.as_deref() != Some("Bearer secret-token") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "object": "error", "code": "unauthorized" })),
        );
    }

    match (collection_id.as_str(), body.get("start_cursor").and_then(Value::as_str)) {
        ("paged", None) => (
            StatusCode::OK,
            Json(json!({
                "results": [row("a", "Espresso"), row("b", "Cortado")],
                "has_more": true,
                "next_cursor": "page-2"
            })),
        ),
        ("paged", Some("page-2")) => (
            StatusCode::OK,
            Json(json!({ "results": [row("c", "Latte")], "has_more": false, "next_cursor": null })),
        ),
        ("empty", _) => (
            StatusCode::OK,
            Json(json!({ "results": [], "has_more": false })),
        ),
        ("mixed", _) => (
            StatusCode::OK,
            Json(json!({
                "results": [
                    row("a", "Mocha"),
                    { "id": "b", "properties": {
                        "Name": { "type": "title", "title": [{ "plain_text": "Affogato" }] },
                        "Category": { "type": "select", "select": { "id": "x" } },
                        "Price": { "number": 5 }
                    } },
                    { "id": 42, "properties": [] },
                    row("d", "Americano")
                ],
                "has_more": false
            })),
        ),
        ("garbled", _) => (StatusCode::OK, Json(json!({ "results": "nope" }))),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "object": "error", "code": "object_not_found" })),
        ),
    }
}

async fn spawn_provider() -> (String, ProviderState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = ProviderState::default();
    let app = Router::new()
        .route("/v1/databases/:collection_id/query", post(handle_query))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), state)
}

fn provider(api_url: String, api_key: Option<&str>) -> HttpContentProvider {
    HttpContentProvider::new(ProviderSettings {
        api_url,
        api_key: api_key.map(str::to_string),
        ..ProviderSettings::default()
    })
    .expect("provider")
}

#[test]
fn key_prefix_never_reveals_more_than_four_characters() {
    assert_eq!(key_prefix("secret_abcdef"), "secr…");
    assert_eq!(key_prefix("ab"), "ab…");
}

#[tokio::test]
async fn query_follows_cursor_until_exhausted() {
    let (api_url, state) = spawn_provider().await;
    let records = provider(api_url, Some("secret-token"))
        .query_collection("paged")
        .await
        .expect("records");

    let ids: Vec<&str> = records.iter().map(|record| record.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);

    let seen = state.seen.lock().await;
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].2["page_size"], 100);
    assert!(seen[0].2.get("start_cursor").is_none());
    assert_eq!(seen[1].2["start_cursor"], "page-2");
}

#[tokio::test]
async fn empty_collection_is_success() {
    let (api_url, _state) = spawn_provider().await;
    let records = provider(api_url, Some("secret-token"))
        .query_collection("empty")
        .await
        .expect("records");
    assert!(records.is_empty());
}

#[tokio::test]
async fn malformed_rows_and_properties_do_not_cost_the_page() {
    let (api_url, _state) = spawn_provider().await;
    let records = provider(api_url, Some("secret-token"))
        .query_collection("mixed")
        .await
        .expect("records");

    assert_eq!(records.len(), 4);
    assert_eq!(records[1].title().as_deref(), Some("Affogato"));
    assert_eq!(records[1].select(&["Category"]), None);
    assert_eq!(records[1].number(&["Price"]), None);
    assert_eq!(records[2], RawContentRecord::default());
    assert_eq!(records[3].id, "d");
}

#[tokio::test]
async fn missing_api_key_fails_without_calling_provider() {
    let (api_url, state) = spawn_provider().await;
    let err = provider(api_url, Some("  "))
        .query_collection("paged")
        .await
        .expect_err("should fail");
    assert!(matches!(
        err,
        ContentFetchError::ConfigurationMissing(API_KEY_SETTING)
    ));
    assert!(state.seen.lock().await.is_empty());
}

#[tokio::test]
async fn rejected_credentials_surface_status_error() {
    let (api_url, _state) = spawn_provider().await;
    let err = provider(api_url, Some("wrong"))
        .query_collection("paged")
        .await
        .expect_err("should fail");
    match err {
        ContentFetchError::Status { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("unauthorized"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let (api_url, _state) = spawn_provider().await;
    let err = provider(api_url, Some("secret-token"))
        .query_collection("garbled")
        .await
        .expect_err("should fail");
    assert!(matches!(err, ContentFetchError::Decode(_)));
}

#[tokio::test]
async fn unreachable_provider_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = provider(format!("http://{addr}"), Some("secret-token"))
        .query_collection("paged")
        .await
        .expect_err("should fail");
    assert!(matches!(err, ContentFetchError::Transport(_)));
}

#[test]
fn api_url_with_path_prefix_keeps_prefix() {
    let provider = provider("http://proxy.local/content".into(), Some("k"));
    let url = provider.query_url("db").expect("url");
    assert_eq!(url.as_str(), "http://proxy.local/content/v1/databases/db/query");
}
