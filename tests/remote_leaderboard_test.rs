//! Tests for the REST leaderboard client against an in-process mock store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
};
use serde_json::{Value, json};

use strictly_challenge::{
    CachedLeaderboard, DEFAULT_TIMEOUT, GameMode, LeaderboardEntry, LeaderboardSync,
    RestLeaderboard,
};

const KEY: &str = "test-key";

#[derive(Default)]
struct MockStore {
    rows: Vec<Value>,
    next_id: i64,
    patches: usize,
    posts: usize,
}

type Shared = Arc<Mutex<MockStore>>;

fn authorized(headers: &HeaderMap) -> bool {
    let apikey = headers.get("apikey").and_then(|v| v.to_str().ok());
    let bearer = headers.get("authorization").and_then(|v| v.to_str().ok());
    apikey == Some(KEY) && bearer == Some(format!("Bearer {}", KEY).as_str())
}

fn eq_filter(params: &HashMap<String, String>, key: &str) -> Option<String> {
    params.get(key).and_then(|v| v.strip_prefix("eq.")).map(str::to_string)
}

fn matches(row: &Value, params: &HashMap<String, String>) -> bool {
    ["name", "mode", "id"].iter().all(|key| match eq_filter(params, key) {
        Some(wanted) => match &row[*key] {
            Value::String(s) => *s == wanted,
            other => other.to_string() == wanted,
        },
        None => true,
    })
}

async fn list(
    State(store): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Value>>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let store = store.lock().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let mut rows: Vec<Value> = store.rows.iter().filter(|r| matches(r, &params)).cloned().collect();
    rows.sort_by_key(|r| std::cmp::Reverse(r["score"].as_i64().unwrap_or_default()));
    if let Some(limit) = params.get("limit").and_then(|l| l.parse().ok()) {
        rows.truncate(limit);
    }
    Ok(Json(rows))
}

async fn create(
    State(store): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Result<(StatusCode, Json<Vec<Value>>), StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let mut store = store.lock().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    store.next_id += 1;
    store.posts += 1;
    body["id"] = json!(store.next_id);
    store.rows.push(body.clone());
    Ok((StatusCode::CREATED, Json(vec![body])))
}

async fn update(
    State(store): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Result<Json<Vec<Value>>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let mut store = store.lock().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    store.patches += 1;
    let mut updated = Vec::new();
    for row in store.rows.iter_mut().filter(|r| matches(r, &params)) {
        if let (Some(row), Some(fields)) = (row.as_object_mut(), body.as_object()) {
            for (key, value) in fields {
                row.insert(key.clone(), value.clone());
            }
        }
        updated.push(row.clone());
    }
    Ok(Json(updated))
}

/// Starts the mock store and returns its base URL.
async fn spawn_store(store: Shared) -> String {
    let app = Router::new()
        .route("/rest/v1/leaderboard", get(list).post(create).patch(update))
        .with_state(store);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Bind failed");
    let addr = listener.local_addr().expect("No local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });
    format!("http://{}", addr)
}

fn entry(name: &str, score: i64) -> LeaderboardEntry {
    LeaderboardEntry::new(name.to_string(), GameMode::Ai, 2, 2, 1, score, 31_000)
}

#[tokio::test]
async fn test_upsert_posts_then_patches_only_when_better() {
    let store = Shared::default();
    let base = spawn_store(store.clone()).await;
    let client = RestLeaderboard::new(&base, KEY, DEFAULT_TIMEOUT).expect("Client");

    let created = client.upsert(entry("Ada", 120)).await.expect("Create");
    assert_eq!(created, entry("Ada", 120));

    let kept = client.upsert(entry("Ada", 120)).await.expect("Lookup");
    assert_eq!(*kept.score(), 120);

    let improved = client.upsert(entry("Ada", 205)).await.expect("Improve");
    assert_eq!(*improved.score(), 205);

    let counts = {
        let store = store.lock().expect("Lock");
        (store.posts, store.patches, store.rows.len())
    };
    assert_eq!(counts, (1, 1, 1));
}

#[tokio::test]
async fn test_fetch_all_returns_entries_by_score() {
    let store = Shared::default();
    let base = spawn_store(store.clone()).await;
    let client = RestLeaderboard::new(&base, KEY, DEFAULT_TIMEOUT).expect("Client");

    client.upsert(entry("Low", -40)).await.expect("Create");
    client.upsert(entry("High", 300)).await.expect("Create");

    let names: Vec<String> = client
        .fetch_all()
        .await
        .expect("Fetch")
        .iter()
        .map(|e| e.name().clone())
        .collect();
    assert_eq!(names, vec!["High", "Low"]);

    let guard = store.lock().expect("Lock");
    let wire = &guard.rows[0];
    assert_eq!(wire["best_time"], json!(31_000));
    assert_eq!(wire["mode"], json!("ai"));
}

#[tokio::test]
async fn test_wrong_key_is_an_error() {
    let base = spawn_store(Shared::default()).await;
    let client = RestLeaderboard::new(&base, "wrong", DEFAULT_TIMEOUT).expect("Client");
    assert!(client.fetch_all().await.is_err());
    assert!(client.upsert(entry("Ada", 10)).await.is_err());
}

#[tokio::test]
async fn test_cache_serves_last_standings_when_store_is_down() {
    let dir = tempfile::tempdir().expect("Temp dir");
    let cache_path = dir.path().join("leaderboard.json");

    let base = spawn_store(Shared::default()).await;
    let online = CachedLeaderboard::new(
        RestLeaderboard::new(&base, KEY, DEFAULT_TIMEOUT).expect("Client"),
        &cache_path,
    );
    online.upsert(entry("Ada", 150)).await.expect("Create");
    online.fetch_all().await.expect("Fetch");

    // Nothing listens on port 9 of the loopback.
    let offline = CachedLeaderboard::new(
        RestLeaderboard::new("http://127.0.0.1:9", KEY, DEFAULT_TIMEOUT).expect("Client"),
        &cache_path,
    );
    let cached = offline.fetch_all().await.expect("Cached standings");
    assert_eq!(cached, vec![entry("Ada", 150)]);
}
