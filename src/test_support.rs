//! Fixtures shared by unit tests: an in-process fake backend and an
//! instrumented token store.

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::api::auth::AuthContext;
use crate::storage::{KeyValueStore, MemoryStore};

#[derive(Default)]
pub struct BackendState {
    pub requests: AtomicUsize,
    pub auth_headers: Mutex<Vec<Option<String>>>,
    pub saved_settings: Mutex<Vec<Value>>,
    pub reject_all: AtomicBool,
    pub empty_markets: AtomicBool,
    pub fail_settings: AtomicBool,
}

pub struct FakeBackend {
    pub base_url: String,
    pub state: Arc<BackendState>,
}

type Shared = State<Arc<BackendState>>;

fn admit(state: &BackendState, headers: &HeaderMap) -> Option<Response> {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.auth_headers.lock().unwrap().push(auth);

    if state.reject_all.load(Ordering::SeqCst) {
        return Some((StatusCode::UNAUTHORIZED, "token expired").into_response());
    }
    None
}

pub fn market_fixture(index: usize) -> Value {
    json!({
        "id": format!("market-{}", index),
        "title": format!("Market {}", index),
        "volume": 1000.0 * index as f64,
        "status": if index % 3 == 0 { "active" } else { "resolved" },
        "resolution": if index % 3 == 0 { Value::Null } else { json!("YES") },
        "endDate": "2024-06-30T00:00:00Z"
    })
}

pub fn details_fixture(id: &str) -> Value {
    json!({
        "id": id,
        "title": "Will BTC close above $100k?",
        "description": "Resolves YES if the daily close exceeds $100,000.",
        "currentPrice": 0.65,
        "volume24h": 125000.5,
        "trades24h": 42,
        "openInterest": 80000,
        "resolutionDate": "2024-12-31T00:00:00Z",
        "status": "active"
    })
}

async fn stats(State(state): Shared, headers: HeaderMap) -> Response {
    if let Some(rejection) = admit(&state, &headers) {
        return rejection;
    }
    Json(json!({
        "totalMarkets": 50,
        "activeMarkets": 12,
        "totalVolume": 1000000,
        "totalTrades": 3400
    }))
    .into_response()
}

async fn markets(State(state): Shared, headers: HeaderMap) -> Response {
    if let Some(rejection) = admit(&state, &headers) {
        return rejection;
    }
    if state.empty_markets.load(Ordering::SeqCst) {
        return Json(json!({})).into_response();
    }
    let markets: Vec<Value> = (0..23).map(market_fixture).collect();
    Json(json!({ "markets": markets })).into_response()
}

async fn market(State(state): Shared, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if let Some(rejection) = admit(&state, &headers) {
        return rejection;
    }
    match id.as_str() {
        "missing" => (StatusCode::NOT_FOUND, "Market not found").into_response(),
        "bad-json" => (StatusCode::OK, "not json").into_response(),
        _ => Json(details_fixture(&id)).into_response(),
    }
}

async fn market_events(
    State(state): Shared,
    headers: HeaderMap,
    Path(_id): Path<String>,
) -> Response {
    if let Some(rejection) = admit(&state, &headers) {
        return rejection;
    }
    Json(json!([
        {"id": "e3", "type": "trade", "price": 0.70, "amount": 5, "timestamp": "2024-01-03T00:00:00Z"},
        {"id": "e1", "type": "order", "price": 0.60, "amount": 10, "timestamp": "2024-01-01T00:00:00Z"},
        {"id": "e2", "type": "trade", "price": 0.65, "amount": 7, "timestamp": "2024-01-02T00:00:00Z"}
    ]))
    .into_response()
}

async fn health(State(state): Shared, headers: HeaderMap) -> Response {
    if let Some(rejection) = admit(&state, &headers) {
        return rejection;
    }
    Json(json!({"status": "ok"})).into_response()
}

async fn save_settings(State(state): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Some(rejection) = admit(&state, &headers) {
        return rejection;
    }
    if state.fail_settings.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "db unavailable").into_response();
    }
    state.saved_settings.lock().unwrap().push(body);
    Json(json!({"status": "ok"})).into_response()
}

pub async fn spawn_backend() -> FakeBackend {
    let state = Arc::new(BackendState::default());
    let app = Router::new()
        .route("/api/stats", get(stats))
        .route("/api/markets", get(markets))
        .route("/api/markets/:id", get(market))
        .route("/api/markets/:id/events", get(market_events))
        .route("/api/health", get(health))
        .route("/api/settings", post(save_settings))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeBackend {
        base_url: format!("http://{}", addr),
        state,
    }
}

/// Memory store that counts removals.
#[derive(Default)]
pub struct CountingStore {
    pub inner: MemoryStore,
    pub removals: AtomicUsize,
}

impl KeyValueStore for CountingStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        self.removals.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(key)
    }
}

/// Auth context over a counting store; the counter tracks unauthorized callbacks.
pub fn test_auth() -> (Arc<AuthContext>, Arc<CountingStore>, Arc<AtomicUsize>) {
    let store = Arc::new(CountingStore::default());
    let redirects = Arc::new(AtomicUsize::new(0));
    let counter = redirects.clone();
    let auth = AuthContext::new(
        store.clone(),
        "token",
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );
    (Arc::new(auth), store, redirects)
}
