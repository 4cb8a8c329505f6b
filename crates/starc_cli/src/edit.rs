//! `starc edit`: keep a local file and a remote document in sync until Ctrl-C.

use crate::format::score_line;
use anyhow::{anyhow, Context};
use starc_client::ApiClient;
use starc_core::models::scores::ScoreSet;
use starc_core::models::DocumentId;
use starc_core::Config;
use starc_editor::{
    spawn_backend, ControllerSettings, DocumentController, Phase, SaveStatus, ScoreStore,
};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(200);
const FLUSH_POLL: Duration = Duration::from_millis(50);

/// Local file the document is mirrored into.
struct FileMirror {
    path: PathBuf,
    last_seen: Option<String>,
}

impl FileMirror {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            last_seen: None,
        }
    }

    fn is_seeded(&self) -> bool {
        self.last_seen.is_some()
    }

    /// Reconcile the file with the loaded document.
    ///
    /// A missing file is created from `remote`. An existing file that differs
    /// is returned so it can be applied as an edit.
    async fn seed(&mut self, remote: &str) -> anyhow::Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(local) => {
                let changed = (local != remote).then(|| local.clone());
                self.last_seen = Some(local);
                Ok(changed)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tokio::fs::write(&self.path, remote)
                    .await
                    .with_context(|| format!("failed to write {}", self.path.display()))?;
                self.last_seen = Some(remote.to_string());
                Ok(None)
            }
            Err(err) => {
                Err(err).with_context(|| format!("failed to read {}", self.path.display()))
            }
        }
    }

    /// New file contents since the last poll, if any.
    async fn poll(&mut self) -> anyhow::Result<Option<String>> {
        let current = match tokio::fs::read_to_string(&self.path).await {
            Ok(current) => current,
            // Editors often replace the file on save; wait for it to reappear.
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", self.path.display()))
            }
        };
        if self.last_seen.as_deref() == Some(current.as_str()) {
            return Ok(None);
        }
        self.last_seen = Some(current.clone());
        Ok(Some(current))
    }
}

fn render_scores(scores: &ScoreSet, json: bool) -> anyhow::Result<String> {
    if json {
        return Ok(serde_json::to_string(scores)?);
    }
    Ok(format!("scores: {}", score_line(scores)))
}

/// Wait for outstanding edits to reach the server before shutting down.
async fn flush(controller: &mut DocumentController, timeout: Duration) {
    if !controller.has_unsaved_changes() || !controller.save_now() {
        return;
    }
    let deadline = Instant::now() + timeout;
    while controller.save_status() == SaveStatus::Saving && Instant::now() < deadline {
        sleep(FLUSH_POLL).await;
        controller.tick(Instant::now());
    }
    if controller.save_status() != SaveStatus::Saved {
        warn!(
            document_id = controller.document_id(),
            "exiting with unsaved changes"
        );
    }
}

/// Mirror document `id` into `path`, autosaving local changes.
///
/// # Returns
/// A summary line once the user interrupts the loop.
pub(crate) async fn run_edit(
    client: &ApiClient,
    config: &Config,
    id: DocumentId,
    path: &Path,
    json: bool,
) -> anyhow::Result<String> {
    let backend = spawn_backend(client.clone()).context("failed to start backend worker")?;
    let scores = ScoreStore::new();
    let mut score_rx = scores.subscribe();
    let mut controller = DocumentController::open(
        backend,
        scores,
        id,
        None,
        ControllerSettings::from_config(config),
    );
    client.session().set_open_document(Some(id))?;

    let mut ticker = interval(POLL_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut mirror = FileMirror::new(path);
    let mut printed_scores: Option<ScoreSet> = None;
    let mut reported_error: Option<String> = None;
    let mut last_status = controller.save_status();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    // Errors end the loop but still go through the flush below.
    let outcome: anyhow::Result<()> = loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                debug!(document_id = id, "interrupt received");
                break Ok(());
            }
            changed = score_rx.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let latest = score_rx.borrow_and_update().scores;
                if let Some(latest) = latest {
                    if printed_scores != Some(latest) {
                        match render_scores(&latest, json) {
                            Ok(line) => println!("{}", line),
                            Err(err) => break Err(err),
                        }
                        printed_scores = Some(latest);
                    }
                }
            }
            _ = ticker.tick() => {
                let now = Instant::now();
                controller.tick(now);

                if controller.needs_login() {
                    break Err(anyhow!("session expired; run `starc login`"));
                }
                match controller.phase() {
                    Phase::Loading => continue,
                    Phase::Error => break Err(anyhow!(controller
                        .load_error()
                        .unwrap_or("document could not be loaded")
                        .to_string())),
                    _ => {}
                }

                if !mirror.is_seeded() {
                    let local = match mirror.seed(controller.text()).await {
                        Ok(local) => local,
                        Err(err) => break Err(err),
                    };
                    info!(document_id = id, path = %path.display(), "editing document");
                    if !json {
                        println!("Editing \"{}\" in {} (Ctrl-C to stop)", controller.title(), path.display());
                    }
                    if let Some(local) = local {
                        controller.edit(local, now);
                    }
                    continue;
                }

                match mirror.poll().await {
                    Ok(Some(text)) => {
                        controller.edit(text, now);
                    }
                    Ok(None) => {}
                    Err(err) => {
                        warn!(document_id = id, error = %err, "stopped watching the local file");
                        break Err(err);
                    }
                }

                let status = controller.save_status();
                if status == SaveStatus::Saved && last_status != SaveStatus::Saved && !json {
                    if let Some(label) = controller.last_saved_label() {
                        println!("Saved at {}", label);
                    }
                }
                last_status = status;

                let error = controller.last_error().map(str::to_string);
                if error.is_some() && error != reported_error {
                    if let Some(message) = error.as_deref() {
                        eprintln!("warning: {}", message);
                    }
                }
                reported_error = error;
            }
        }
    };

    flush(&mut controller, config.request_timeout).await;
    controller.teardown();
    if let Err(err) = client.session().set_open_document(None) {
        warn!("failed to clear open document: {}", err);
    }
    outcome?;
    Ok(format!("Stopped editing document {}", id))
}
