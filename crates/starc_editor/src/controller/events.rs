//! Applying backend events to controller state.

use super::{DocumentController, LoadState, SaveStatus, WriteKind};
use crate::backend::{CoreErrorSource, CoreEvent};
use crate::history::HistoryPanel;
use chrono::Local;
use starc_client::ErrorClass;
use starc_core::models::scores::ScoreSet;
use starc_core::SaveScoreSource;
use tracing::{debug, info, warn};

impl DocumentController {
    pub(super) fn apply_event(&mut self, event: CoreEvent) {
        match event {
            CoreEvent::DocumentLoaded {
                seq,
                document,
                scores,
            } => {
                if self.load != LoadState::Pending(seq) {
                    debug!(seq, "ignoring stale document load");
                    return;
                }
                self.title = document.title;
                self.buffer.set_text(document.text);
                if let Some(scores) = scores {
                    self.scores.apply(seq, scores);
                }
                self.scores.set_loading(false);
                self.load = LoadState::Loaded;
                self.confirmed_revision = self.content_revision;
                self.save_status = SaveStatus::Saved;
                info!(document_id = self.document_id, "document loaded");
            }
            CoreEvent::ScoresFetched { seq, scores } => {
                if let Some(scores) = scores {
                    self.scores.apply(seq, scores);
                }
                if self.score_fetch_seq == Some(seq) {
                    self.score_fetch_seq = None;
                    self.scores.set_loading(false);
                }
            }
            CoreEvent::DocumentSaved {
                seq,
                final_scores,
                initial_scores,
            } => {
                let Some(write) = self.finish_write(seq) else {
                    debug!(seq, "ignoring reply for unknown save");
                    return;
                };
                // The server now holds this revision even if the buffer moved on.
                self.confirmed_revision = self.confirmed_revision.max(write.revision);
                if seq < self.text_barrier {
                    debug!(seq, barrier = self.text_barrier, "discarding superseded save reply");
                } else {
                    self.last_saved_at = Some(Local::now());
                    self.apply_save_scores(seq, final_scores, initial_scores);
                }
                self.dispatch_queued_write();
                self.settle_save_status();
            }
            CoreEvent::Rewritten { seq, text, scores } => {
                if self.rewrite_seq != Some(seq) {
                    debug!(seq, "ignoring stale rewrite");
                    return;
                }
                self.rewrite_seq = None;
                // Pending keystrokes described the pre-rewrite text.
                self.autosave.cancel();
                self.buffer.set_text(text);
                self.content_revision = self.content_revision.wrapping_add(1);
                let barrier = self.fence.next();
                self.text_barrier = barrier;
                if let Some(scores) = scores {
                    self.scores.apply(barrier, scores);
                }
                self.scores.set_loading(false);

                let request = self.snapshot();
                self.start_write(WriteKind::RewritePersist, request);
            }
            CoreEvent::RewriteSaved { seq } => {
                let Some(write) = self.finish_write(seq) else {
                    debug!(seq, "ignoring reply for unknown rewrite persist");
                    return;
                };
                self.confirmed_revision = self.confirmed_revision.max(write.revision);
                self.last_saved_at = Some(Local::now());
                self.dispatch_queued_write();
                self.settle_save_status();
            }
            CoreEvent::HistoryLoaded { seq, entries } => {
                if self.history_seq != Some(seq) {
                    return;
                }
                match self.history.as_mut() {
                    Some(panel) => panel.set_entries(entries),
                    None => self.history = Some(HistoryPanel::with_entries(entries)),
                }
            }
            CoreEvent::Error {
                seq,
                source,
                class,
                message,
            } => self.apply_error(seq, source, class, message),
        }
    }

    fn apply_save_scores(
        &mut self,
        seq: u64,
        final_scores: Option<ScoreSet>,
        initial_scores: Option<ScoreSet>,
    ) {
        let chosen = match self.settings.save_score_source {
            SaveScoreSource::Final => final_scores.or(initial_scores),
            SaveScoreSource::Initial => initial_scores.or(final_scores),
            SaveScoreSource::Refetch => None,
        };
        match chosen {
            Some(scores) => {
                self.scores.apply(seq, scores);
            }
            None => {
                self.fetch_scores();
            }
        }
    }

    fn apply_error(
        &mut self,
        seq: u64,
        source: CoreErrorSource,
        class: ErrorClass,
        message: String,
    ) {
        if class == ErrorClass::Authentication {
            self.needs_login = true;
        }
        match source {
            CoreErrorSource::Load => {
                if self.load == LoadState::Pending(seq) {
                    self.scores.set_loading(false);
                    self.load = LoadState::Failed(message);
                }
            }
            CoreErrorSource::Scores => {
                if self.score_fetch_seq == Some(seq) {
                    self.score_fetch_seq = None;
                    self.scores.set_loading(false);
                }
            }
            CoreErrorSource::Save | CoreErrorSource::SaveRewrite => {
                if self.finish_write(seq).is_some() {
                    self.dispatch_queued_write();
                }
                self.settle_save_status();
            }
            CoreErrorSource::Rewrite => {
                if self.rewrite_seq == Some(seq) {
                    self.rewrite_seq = None;
                    self.scores.set_loading(false);
                    self.last_error = Some(message);
                }
            }
            CoreErrorSource::History => {
                if self.history_seq == Some(seq) {
                    if let Some(panel) = self.history.as_mut() {
                        panel.set_failed(message);
                    }
                }
            }
            CoreErrorSource::Worker => {
                warn!("backend worker failed: {}", message);
                self.last_error = Some(message);
            }
        }
    }
}
