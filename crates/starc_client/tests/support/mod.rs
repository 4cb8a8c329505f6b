//! In-process mock of the document API for client integration tests.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use starc_client::ApiClient;
use starc_core::session::MemorySessionStore;
use starc_core::{Session, SessionHandle};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) const REFRESH_TOKEN: &str = "refresh-1";

#[derive(Default)]
pub(crate) struct MockApi {
    valid_token: Mutex<String>,
    pub(crate) refresh_calls: AtomicUsize,
    pub(crate) refresh_fails: AtomicBool,
    pub(crate) rewrite_calls: AtomicUsize,
    pub(crate) saved_bodies: Mutex<Vec<Value>>,
    pub(crate) history_posts: Mutex<Vec<(i64, Value)>>,
    pub(crate) uploads: Mutex<Vec<Bytes>>,
    pub(crate) bearer_seen: Mutex<Vec<String>>,
}

impl MockApi {
    pub(crate) fn valid_token(&self) -> String {
        self.valid_token.lock().expect("token lock").clone()
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let bearer = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .unwrap_or_default()
            .to_string();
        self.bearer_seen
            .lock()
            .expect("bearer lock")
            .push(bearer.clone());
        bearer == self.valid_token()
    }
}

type Shared = Arc<MockApi>;

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Token has expired"})),
    )
        .into_response()
}

macro_rules! require_auth {
    ($state:expr, $headers:expr) => {
        if !$state.authorized(&$headers) {
            return unauthorized();
        }
    };
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["login_identifier"] == "writer" && body["password"] == "secret" {
        Json(json!({"access_token": "valid", "refresh_token": REFRESH_TOKEN})).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid credentials"})),
        )
            .into_response()
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["username"] == "taken" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Username already exists"})),
        )
            .into_response();
    }
    (StatusCode::CREATED, Json(json!({"message": "User registered"}))).into_response()
}

async fn refresh(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let bearer = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if bearer != format!("Bearer {}", REFRESH_TOKEN) || state.refresh_fails.load(Ordering::SeqCst)
    {
        return unauthorized();
    }
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    // Keep the refresh open long enough for concurrent 401s to queue behind it.
    tokio::time::sleep(Duration::from_millis(50)).await;
    *state.valid_token.lock().expect("token lock") = "rotated".to_string();
    Json(json!({"access_token": "rotated"})).into_response()
}

async fn search(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    require_auth!(state, headers);
    match params.get("q").map(String::as_str) {
        Some("nothing") => StatusCode::NO_CONTENT.into_response(),
        Some("empty") => Json(json!({"message": "No documents match", "results": []})).into_response(),
        _ => {
            let page: usize = params
                .get("page")
                .and_then(|page| page.parse().ok())
                .unwrap_or(1);
            Json(json!({
                "total_items": 5,
                "current_page": page,
                "results": [
                    {"id": 1, "title": "Q3 outlook", "word_count": 120},
                    {"id": 2, "title": "Board memo", "word_count": 48}
                ]
            }))
            .into_response()
        }
    }
}

async fn create_document(State(state): State<Shared>, headers: HeaderMap) -> Response {
    require_auth!(state, headers);
    (StatusCode::CREATED, Json(json!({"document_id": 9}))).into_response()
}

async fn get_document(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    require_auth!(state, headers);
    if id == 404 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Document not found or access denied"})),
        )
            .into_response();
    }
    Json(json!({"title": "Draft", "text_chunk": "hello world"})).into_response()
}

async fn update_document(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    require_auth!(state, headers);
    state.saved_bodies.lock().expect("saved lock").push(body);
    Json(json!({
        "message": "Document updated",
        "document_id": id,
        "initial_scores": [10.0, 20.0, 30.0, 40.0],
        "final_scores": [{"score": 72.4, "optimism": 60.0, "forecast": 55.0, "confidence": 81.0}]
    }))
    .into_response()
}

async fn delete_document(State(state): State<Shared>, headers: HeaderMap) -> Response {
    require_auth!(state, headers);
    StatusCode::NO_CONTENT.into_response()
}

async fn get_scores(State(state): State<Shared>, headers: HeaderMap) -> Response {
    require_auth!(state, headers);
    Json(json!([{"score": 72.0, "optimism": 60.0, "forecast": 55.0, "confidence": 81.0}]))
        .into_response()
}

async fn rewrite(State(state): State<Shared>, headers: HeaderMap) -> Response {
    require_auth!(state, headers);
    state.rewrite_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({"rewritten_text": "X", "scores": [80, 70, 60, 90]})).into_response()
}

async fn history(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    require_auth!(state, headers);
    Json(json!([
        {"id": 1, "document_id": id, "content": "first", "created_at": "2024-03-01T10:00:00"},
        {"id": 3, "document_id": id, "content": "third", "created_at": "2024-03-03T10:00:00Z"},
        {"id": 2, "document_id": id, "content": "second", "created_at": "2024-03-02 10:00:00"}
    ]))
    .into_response()
}

async fn create_history(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    require_auth!(state, headers);
    state
        .history_posts
        .lock()
        .expect("history lock")
        .push((id, body));
    (StatusCode::CREATED, Json(json!({"message": "History saved"}))).into_response()
}

async fn upload_pdf(State(state): State<Shared>, headers: HeaderMap, body: Bytes) -> Response {
    require_auth!(state, headers);
    state.uploads.lock().expect("uploads lock").push(body);
    Json(json!({"message": "PDF uploaded"})).into_response()
}

async fn user_stats(State(state): State<Shared>, headers: HeaderMap) -> Response {
    require_auth!(state, headers);
    Json(json!({
        "email": "writer@example.com",
        "totalDocuments": 4,
        "totalRewrites": 11,
        "timeSaved": 2.5,
        "lastActivity": "2024-03-03"
    }))
    .into_response()
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/refresh", post(refresh))
        .route("/api/search", get(search))
        .route("/docs", post(create_document))
        .route("/docs/pdf", post(upload_pdf))
        .route("/docs/user/stats", get(user_stats))
        .route("/docs/scores/:id", get(get_scores))
        .route(
            "/docs/:id",
            get(get_document).put(update_document).delete(delete_document),
        )
        .route("/docs/:id/history", get(history).post(create_history))
        .route("/fix/:id/rewrite", post(rewrite))
        .with_state(state)
}

/// Start the mock API and return its state plus base URL.
pub(crate) async fn spawn_mock() -> (Shared, String) {
    let state = Arc::new(MockApi {
        valid_token: Mutex::new("valid".to_string()),
        ..MockApi::default()
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock api");
    let addr = listener.local_addr().expect("mock addr");
    let app = router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve mock api");
    });
    (state, format!("http://{}", addr))
}

/// Client against `base` with an in-memory session.
pub(crate) fn client_for(base: &str) -> (ApiClient, SessionHandle) {
    let session = Session::init(MemorySessionStore::default()).expect("session");
    let client =
        ApiClient::new(base, session.clone(), Duration::from_secs(5)).expect("api client");
    (client, session)
}
