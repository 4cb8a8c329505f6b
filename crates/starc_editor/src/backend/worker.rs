//! Background worker thread that owns the async runtime and API client.

use crate::backend::{CoreCmd, CoreErrorSource, CoreEvent};
use crate::rewrite::RewriteEngine;
use crossbeam_channel::{unbounded, Receiver, Sender};
use starc_client::{ApiClient, ApiError, ErrorClass};
use starc_core::models::document::UpdateDocumentRequest;
use std::thread;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Handle for sending commands to, and receiving events from, the backend worker.
pub struct BackendHandle {
    pub cmd_tx: Sender<CoreCmd>,
    pub evt_rx: Receiver<CoreEvent>,
}

fn send_error(evt_tx: &Sender<CoreEvent>, seq: u64, source: CoreErrorSource, err: &ApiError) {
    let _ = evt_tx.send(CoreEvent::Error {
        seq,
        source,
        class: err.class(),
        message: err.user_message(),
    });
}

/// Spawn the backend worker thread.
///
/// The worker owns a multi-threaded tokio runtime. Each command becomes its
/// own task, so a slow save never blocks a score fetch. The worker exits when
/// every command sender is dropped.
///
/// # Errors
/// Returns an error if the worker thread cannot be spawned.
pub fn spawn_backend(client: ApiClient) -> std::io::Result<BackendHandle> {
    let (cmd_tx, cmd_rx) = unbounded::<CoreCmd>();
    let (evt_tx, evt_rx) = unbounded();

    thread::Builder::new()
        .name("starc-editor-backend".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .thread_name("starc-editor-io")
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("backend runtime failed to start: {}", err);
                    let _ = evt_tx.send(CoreEvent::Error {
                        seq: 0,
                        source: CoreErrorSource::Worker,
                        class: ErrorClass::Transient,
                        message: format!("Backend unavailable: {}", err),
                    });
                    return;
                }
            };
            let engine = RewriteEngine::new(client.clone());
            let mut in_flight: Vec<JoinHandle<()>> = Vec::new();

            for cmd in cmd_rx.iter() {
                in_flight.retain(|task| !task.is_finished());
                if matches!(cmd, CoreCmd::AbortAll) {
                    debug!(tasks = in_flight.len(), "aborting in-flight backend tasks");
                    for task in in_flight.drain(..) {
                        task.abort();
                    }
                    continue;
                }
                let task = run_command(client.clone(), engine.clone(), evt_tx.clone(), cmd);
                in_flight.push(runtime.spawn(task));
            }
            debug!("backend command channel closed; worker exiting");
        })?;

    Ok(BackendHandle { cmd_tx, evt_rx })
}

async fn run_command(
    client: ApiClient,
    engine: RewriteEngine,
    evt_tx: Sender<CoreEvent>,
    cmd: CoreCmd,
) {
    let started = Instant::now();
    match cmd {
        CoreCmd::LoadDocument { seq, id } => {
            let (document, scores) = tokio::join!(client.get_document(id), client.get_scores(id));
            match document {
                Ok(document) => {
                    let scores = match scores {
                        Ok(scores) => scores,
                        Err(err) => {
                            warn!(document_id = id, error = %err, "initial score fetch failed");
                            None
                        }
                    };
                    let _ = evt_tx.send(CoreEvent::DocumentLoaded {
                        seq,
                        document,
                        scores,
                    });
                }
                Err(err) => {
                    error!(document_id = id, error = %err, "document load failed");
                    send_error(&evt_tx, seq, CoreErrorSource::Load, &err);
                }
            }
        }
        CoreCmd::FetchScores { seq, id } => match client.get_scores(id).await {
            Ok(scores) => {
                let _ = evt_tx.send(CoreEvent::ScoresFetched { seq, scores });
            }
            Err(err) => {
                warn!(document_id = id, error = %err, "score fetch failed");
                send_error(&evt_tx, seq, CoreErrorSource::Scores, &err);
            }
        },
        CoreCmd::SaveDocument {
            seq,
            id,
            title,
            text,
        } => {
            let request = UpdateDocumentRequest { title, text };
            match client.update_document(id, &request).await {
                Ok(response) => {
                    let _ = evt_tx.send(CoreEvent::DocumentSaved {
                        seq,
                        final_scores: response.final_scores.and_then(|p| p.normalize()),
                        initial_scores: response.initial_scores.and_then(|p| p.normalize()),
                    });
                }
                Err(err) => {
                    warn!(document_id = id, error = %err, "background save failed");
                    send_error(&evt_tx, seq, CoreErrorSource::Save, &err);
                }
            }
        }
        CoreCmd::Rewrite {
            seq,
            id,
            instruction,
        } => match engine.rewrite(id, &instruction).await {
            Ok(outcome) => {
                let _ = evt_tx.send(CoreEvent::Rewritten {
                    seq,
                    text: outcome.text,
                    scores: outcome.scores,
                });
            }
            Err(err) => {
                warn!(document_id = id, error = %err, "rewrite failed");
                send_error(&evt_tx, seq, CoreErrorSource::Rewrite, &err);
            }
        },
        CoreCmd::SaveRewrite { seq, id, text } => match engine.persist(id, &text).await {
            Ok(()) => {
                let _ = evt_tx.send(CoreEvent::RewriteSaved { seq });
            }
            Err(err) => send_error(&evt_tx, seq, CoreErrorSource::SaveRewrite, &err),
        },
        CoreCmd::LoadHistory { seq, id } => match client.get_history(id).await {
            Ok(entries) => {
                let _ = evt_tx.send(CoreEvent::HistoryLoaded { seq, entries });
            }
            Err(err) => {
                warn!(document_id = id, error = %err, "history load failed");
                send_error(&evt_tx, seq, CoreErrorSource::History, &err);
            }
        },
        CoreCmd::AbortAll => {}
    }
    debug!(
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "backend command finished"
    );
}
