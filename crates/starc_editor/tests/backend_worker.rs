//! Worker and controller behavior against an in-process mock API.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use starc_client::{ApiClient, ErrorClass};
use starc_core::models::auth::TokenPair;
use starc_core::{RequestFence, SaveScoreSource, Session};
use starc_editor::backend::{CoreErrorSource, CoreEvent};
use starc_editor::{
    spawn_backend, ControllerSettings, CoreCmd, DocumentController, Phase, SaveStatus, ScoreStore,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

#[derive(Default)]
struct MockApi {
    saved_texts: Mutex<Vec<String>>,
    rewrite_saves: AtomicUsize,
    // Every content write in arrival order, tagged by endpoint.
    writes: Mutex<Vec<String>>,
}

type Shared = Arc<MockApi>;

async fn get_document(Path(id): Path<i64>) -> Response {
    if id == 404 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Document not found or access denied"})),
        )
            .into_response();
    }
    Json(json!({"id": id, "title": "Draft", "text_chunk": "hello world"})).into_response()
}

async fn update_document(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let text = body["text"].as_str().unwrap_or_default().to_string();
    if text == "slow" {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    state
        .writes
        .lock()
        .expect("writes")
        .push(format!("put:{}", text));
    state.saved_texts.lock().expect("saved").push(text);
    Json(json!({
        "message": "Document updated",
        "initial_scores": [10, 10, 10, 10],
        "final_scores": [{"score": 77, "optimism": 66, "forecast": 55, "confidence": 88}]
    }))
    .into_response()
}

async fn get_scores() -> Response {
    Json(json!([{"score": 40, "optimism": 41, "forecast": 42, "confidence": 43}])).into_response()
}

async fn rewrite() -> Response {
    Json(json!({"rewritten_text": "X", "scores": [80, 70, 60, 90]})).into_response()
}

async fn save_rewrite(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let text = body["rewritten_text"].as_str().unwrap_or_default();
    state
        .writes
        .lock()
        .expect("writes")
        .push(format!("rewrite:{}", text));
    state.rewrite_saves.fetch_add(1, Ordering::SeqCst);
    Json(json!({"message": "saved"})).into_response()
}

fn start_mock(runtime: &Runtime) -> (Shared, String) {
    let state = Arc::new(MockApi::default());
    let app = Router::new()
        .route("/docs/scores/:id", get(get_scores))
        .route("/docs/:id", get(get_document).put(update_document))
        .route("/docs/:id/save_rewrite", post(save_rewrite))
        .route("/fix/:id/rewrite", post(rewrite))
        .with_state(state.clone());
    let base = runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock api");
        let addr = listener.local_addr().expect("mock addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock api");
        });
        format!("http://{}", addr)
    });
    (state, base)
}

fn client_for(base: &str) -> ApiClient {
    let session = Session::ephemeral();
    session
        .store_tokens(&TokenPair {
            access_token: "valid".to_string(),
            refresh_token: None,
        })
        .expect("seed token");
    ApiClient::new(base, session, Duration::from_secs(5)).expect("client")
}

fn settings() -> ControllerSettings {
    ControllerSettings {
        save_debounce: Duration::from_millis(50),
        save_score_source: SaveScoreSource::Final,
    }
}

fn wait_until(
    controller: &mut DocumentController,
    what: &str,
    mut done: impl FnMut(&DocumentController) -> bool,
) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        controller.tick(Instant::now());
        if done(controller) {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    panic!("timed out waiting for {}", what);
}

#[test]
fn controller_loads_edits_and_saves_through_the_worker() {
    let runtime = Runtime::new().expect("runtime");
    let (mock, base) = start_mock(&runtime);
    let backend = spawn_backend(client_for(&base)).expect("backend");
    let mut controller = DocumentController::open(backend, ScoreStore::new(), 3, None, settings());

    wait_until(&mut controller, "document load", |c| c.phase() == Phase::Ready);
    assert_eq!(controller.title(), "Draft");
    assert_eq!(controller.text(), "hello world");
    assert_eq!(
        controller.scores().scores().map(|s| s.rounded()),
        Some([40, 41, 43, 42])
    );

    assert!(controller.edit("hello brave new world", Instant::now()));
    wait_until(&mut controller, "save", |c| {
        c.save_status() == SaveStatus::Saved && c.last_saved_at().is_some()
    });
    assert_eq!(
        mock.saved_texts.lock().expect("saved").clone(),
        vec!["hello brave new world".to_string()]
    );
    assert_eq!(
        controller.scores().scores().map(|s| s.rounded()),
        Some([77, 66, 88, 55])
    );
}

#[test]
fn rewrite_is_applied_then_persisted() {
    let runtime = Runtime::new().expect("runtime");
    let (mock, base) = start_mock(&runtime);
    let backend = spawn_backend(client_for(&base)).expect("backend");
    let mut controller = DocumentController::open(backend, ScoreStore::new(), 3, None, settings());
    wait_until(&mut controller, "document load", |c| c.phase() == Phase::Ready);

    assert!(controller.rewrite("more upbeat"));
    wait_until(&mut controller, "rewrite persisted", |c| {
        c.text() == "X" && c.save_status() == SaveStatus::Saved
    });
    assert_eq!(
        controller.scores().scores().map(|s| s.rounded()),
        Some([80, 70, 90, 60])
    );
    assert_eq!(mock.rewrite_saves.load(Ordering::SeqCst), 1);
    assert!(mock.saved_texts.lock().expect("saved").is_empty());
}

fn loaded_controller(base: &str) -> DocumentController {
    let backend = spawn_backend(client_for(base)).expect("backend");
    let mut controller = DocumentController::open(backend, ScoreStore::new(), 3, None, settings());
    wait_until(&mut controller, "document load", |c| c.phase() == Phase::Ready);
    controller
}

#[test]
fn edit_during_a_slow_save_reaches_the_server_last() {
    let runtime = Runtime::new().expect("runtime");
    let (mock, base) = start_mock(&runtime);
    let mut controller = loaded_controller(&base);

    assert!(controller.edit("slow", Instant::now()));
    wait_until(&mut controller, "slow save in flight", |c| {
        c.phase() == Phase::Saving
    });
    assert!(controller.edit("newest", Instant::now()));
    wait_until(&mut controller, "newest save", |c| {
        c.save_status() == SaveStatus::Saved
    });

    assert_eq!(
        mock.saved_texts.lock().expect("saved").clone(),
        vec!["slow".to_string(), "newest".to_string()]
    );
    assert_eq!(controller.text(), "newest");
}

#[test]
fn restore_during_a_slow_save_reaches_the_server_last() {
    let runtime = Runtime::new().expect("runtime");
    let (mock, base) = start_mock(&runtime);
    let mut controller = loaded_controller(&base);

    assert!(controller.edit("slow", Instant::now()));
    wait_until(&mut controller, "slow save in flight", |c| {
        c.phase() == Phase::Saving
    });
    assert!(controller.restore_version("restored", Instant::now()));
    wait_until(&mut controller, "restored save", |c| {
        c.save_status() == SaveStatus::Saved
    });

    let saved = mock.saved_texts.lock().expect("saved").clone();
    assert_eq!(saved.last().map(String::as_str), Some("restored"));
    assert_eq!(saved, vec!["slow".to_string(), "restored".to_string()]);
}

#[test]
fn rewrite_persist_waits_for_a_slow_save() {
    let runtime = Runtime::new().expect("runtime");
    let (mock, base) = start_mock(&runtime);
    let mut controller = loaded_controller(&base);

    assert!(controller.edit("slow", Instant::now()));
    wait_until(&mut controller, "slow save in flight", |c| {
        c.phase() == Phase::Saving
    });
    assert!(controller.rewrite("more upbeat"));
    wait_until(&mut controller, "rewrite persisted", |c| {
        c.text() == "X" && c.save_status() == SaveStatus::Saved
    });

    assert_eq!(
        mock.writes.lock().expect("writes").clone(),
        vec!["put:slow".to_string(), "rewrite:X".to_string()]
    );
}

#[test]
fn missing_document_reports_not_found() {
    let runtime = Runtime::new().expect("runtime");
    let (_mock, base) = start_mock(&runtime);
    let backend = spawn_backend(client_for(&base)).expect("backend");
    backend
        .cmd_tx
        .send(CoreCmd::LoadDocument { seq: 1, id: 404 })
        .expect("send load");

    match backend.evt_rx.recv_timeout(Duration::from_secs(5)) {
        Ok(CoreEvent::Error {
            seq,
            source,
            class,
            message,
        }) => {
            assert_eq!(seq, 1);
            assert_eq!(source, CoreErrorSource::Load);
            assert_eq!(class, ErrorClass::NotFound);
            assert_eq!(message, "Document not found or access denied");
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[test]
fn abort_all_drops_in_flight_replies() {
    let runtime = Runtime::new().expect("runtime");
    let (_mock, base) = start_mock(&runtime);
    let backend = spawn_backend(client_for(&base)).expect("backend");
    backend
        .cmd_tx
        .send(CoreCmd::SaveDocument {
            seq: 1,
            id: 3,
            title: "Draft".to_string(),
            text: "slow".to_string(),
        })
        .expect("send save");
    std::thread::sleep(Duration::from_millis(50));
    backend.cmd_tx.send(CoreCmd::AbortAll).expect("send abort");

    assert!(backend
        .evt_rx
        .recv_timeout(Duration::from_millis(600))
        .is_err());
}

#[test]
fn score_store_fetch_applies_scores_and_clears_loading() {
    let runtime = Runtime::new().expect("runtime");
    let (_mock, base) = start_mock(&runtime);
    let client = client_for(&base);
    let store = ScoreStore::new();
    let fence = RequestFence::new();

    runtime.block_on(store.fetch_scores(&client, 3, &fence));
    let state = store.snapshot();
    assert!(!state.loading);
    assert_eq!(state.scores.map(|s| s.rounded()), Some([40, 41, 43, 42]));
    assert_eq!(state.applied_seq(), 1);
}
