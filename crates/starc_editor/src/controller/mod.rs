//! Document page controller: owns the buffer, the score store handle, and the
//! save/rewrite/history pipelines for one open document.
//!
//! The controller never blocks. Network work is sent to the backend worker as
//! [`CoreCmd`] values and results are applied from [`DocumentController::tick`],
//! which the owner calls from its event loop with the current time.

mod events;

use crate::backend::{BackendHandle, CoreCmd};
use crate::buffer::EditorBuffer;
use crate::history::{HistoryPanel, VersionComparison};
use crate::rewrite::normalize_instruction;
use crate::scores::ScoreStore;
use chrono::{DateTime, Local};
use starc_core::models::document::{Document, UpdateDocumentRequest};
use starc_core::models::scores::ScoreSet;
use starc_core::models::DocumentId;
use starc_core::{Config, Debouncer, RequestFence, SaveScoreSource, DEFAULT_SAVE_DEBOUNCE_MS};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Timing and score-source knobs for a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    pub save_debounce: Duration,
    pub save_score_source: SaveScoreSource,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            save_debounce: Duration::from_millis(DEFAULT_SAVE_DEBOUNCE_MS),
            save_score_source: SaveScoreSource::default(),
        }
    }
}

impl ControllerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            save_debounce: config.save_debounce,
            save_score_source: config.save_score_source,
        }
    }
}

/// Persistence state of the local buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Dirty,
    Saving,
}

/// Coarse state of the document session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
    Saving,
    Rewriting,
    ViewingHistory,
    Error,
}

/// Document data already in hand when opening, e.g. right after creation.
#[derive(Debug, Clone)]
pub struct InitialData {
    pub document: Document,
    pub scores: Option<ScoreSet>,
}

/// Content writes sent to the server. At most one is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteKind {
    Save,
    RewritePersist,
}

#[derive(Debug, Clone, Copy)]
struct WriteInFlight {
    seq: u64,
    revision: u64,
    kind: WriteKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadState {
    Pending(u64),
    Loaded,
    Failed(String),
}

/// Controller for one open document.
pub struct DocumentController {
    backend: BackendHandle,
    settings: ControllerSettings,
    document_id: DocumentId,
    title: String,
    buffer: EditorBuffer,
    scores: ScoreStore,
    fence: RequestFence,
    autosave: Debouncer<UpdateDocumentRequest>,
    save_status: SaveStatus,
    write_in_flight: Option<WriteInFlight>,
    // Sent with the newest buffer once the outstanding write completes.
    queued_write: Option<WriteKind>,
    content_revision: u64,
    // Newest content revision the server has confirmed.
    confirmed_revision: u64,
    // Save replies dispatched before this sequence describe superseded text.
    text_barrier: u64,
    load: LoadState,
    rewrite_seq: Option<u64>,
    score_fetch_seq: Option<u64>,
    history: Option<HistoryPanel>,
    history_seq: Option<u64>,
    last_saved_at: Option<DateTime<Local>>,
    needs_login: bool,
    last_error: Option<String>,
    torn_down: bool,
}

impl DocumentController {
    /// Open document `id`.
    ///
    /// With `initial` data the controller is ready immediately; otherwise the
    /// document and its scores are fetched in parallel.
    pub fn open(
        backend: BackendHandle,
        scores: ScoreStore,
        id: DocumentId,
        initial: Option<InitialData>,
        settings: ControllerSettings,
    ) -> Self {
        let mut controller = Self {
            backend,
            settings,
            document_id: id,
            title: String::new(),
            buffer: EditorBuffer::default(),
            scores,
            fence: RequestFence::new(),
            autosave: Debouncer::new(settings.save_debounce),
            save_status: SaveStatus::Saved,
            write_in_flight: None,
            queued_write: None,
            content_revision: 0,
            confirmed_revision: 0,
            text_barrier: 0,
            load: LoadState::Loaded,
            rewrite_seq: None,
            score_fetch_seq: None,
            history: None,
            history_seq: None,
            last_saved_at: None,
            needs_login: false,
            last_error: None,
            torn_down: false,
        };
        match initial {
            Some(InitialData { document, scores }) => {
                controller.title = document.title;
                controller.buffer = EditorBuffer::new(document.text);
                if let Some(scores) = scores {
                    let seq = controller.fence.next();
                    controller.scores.apply(seq, scores);
                }
            }
            None => {
                let seq = controller.fence.next();
                controller.load = LoadState::Pending(seq);
                controller.scores.set_loading(true);
                if !controller.send(CoreCmd::LoadDocument { seq, id }) {
                    controller.load = LoadState::Failed("Backend unavailable".to_string());
                    controller.scores.set_loading(false);
                }
            }
        }
        controller
    }

    fn send(&mut self, cmd: CoreCmd) -> bool {
        if self.backend.cmd_tx.send(cmd).is_ok() {
            return true;
        }
        warn!(document_id = self.document_id, "backend worker is gone");
        self.last_error = Some("Backend unavailable".to_string());
        false
    }

    fn is_loaded(&self) -> bool {
        self.load == LoadState::Loaded && !self.torn_down
    }

    fn snapshot(&self) -> UpdateDocumentRequest {
        UpdateDocumentRequest {
            title: self.title.clone(),
            text: self.buffer.text().to_string(),
        }
    }

    fn mark_dirty(&mut self, now: Instant) {
        self.content_revision = self.content_revision.wrapping_add(1);
        self.save_status = SaveStatus::Dirty;
        let request = self.snapshot();
        self.autosave.trigger(request, now);
    }

    /// Send a content write, or queue it behind the outstanding one so the
    /// server applies writes in the order they were made.
    fn start_write(&mut self, kind: WriteKind, request: UpdateDocumentRequest) -> bool {
        if self.write_in_flight.is_some() {
            debug!(document_id = self.document_id, ?kind, "queueing write behind in-flight write");
            self.queued_write = Some(kind);
            self.settle_save_status();
            return true;
        }
        let seq = self.fence.next();
        let cmd = match kind {
            WriteKind::Save => CoreCmd::SaveDocument {
                seq,
                id: self.document_id,
                title: request.title,
                text: request.text,
            },
            WriteKind::RewritePersist => CoreCmd::SaveRewrite {
                seq,
                id: self.document_id,
                text: request.text,
            },
        };
        if !self.send(cmd) {
            self.save_status = SaveStatus::Dirty;
            return false;
        }
        self.write_in_flight = Some(WriteInFlight {
            seq,
            revision: self.content_revision,
            kind,
        });
        self.settle_save_status();
        true
    }

    /// Clear the outstanding write if `seq` is its reply.
    fn finish_write(&mut self, seq: u64) -> Option<WriteInFlight> {
        match self.write_in_flight {
            Some(write) if write.seq == seq => self.write_in_flight.take(),
            _ => None,
        }
    }

    /// Send the write queued behind the one that just completed.
    fn dispatch_queued_write(&mut self) {
        if self.write_in_flight.is_some() {
            return;
        }
        if let Some(kind) = self.queued_write.take() {
            // The queued write carries the newest buffer, which covers any
            // keystrokes still waiting on the debounce window.
            if kind == WriteKind::Save {
                self.autosave.cancel();
            }
            let request = self.snapshot();
            self.start_write(kind, request);
        }
    }

    fn settle_save_status(&mut self) {
        let current = self.content_revision;
        let latest_in_flight = self
            .write_in_flight
            .map_or(false, |write| write.revision == current);
        self.save_status = if self.autosave.is_pending() {
            SaveStatus::Dirty
        } else if self.confirmed_revision == current && self.queued_write.is_none() {
            SaveStatus::Saved
        } else if latest_in_flight || self.queued_write.is_some() {
            SaveStatus::Saving
        } else {
            SaveStatus::Dirty
        };
    }

    /// Replace the buffer text after a user edit and arm the debounced save.
    ///
    /// # Returns
    /// `false` when the text is unchanged or the document is not editable.
    pub fn edit(&mut self, text: impl Into<String>, now: Instant) -> bool {
        if !self.is_loaded() || !self.buffer.set_text(text) {
            return false;
        }
        self.mark_dirty(now);
        true
    }

    /// Change the title; saved through the same debounced pipeline as text.
    pub fn set_title(&mut self, title: impl Into<String>, now: Instant) -> bool {
        let title = title.into();
        if !self.is_loaded() || title == self.title {
            return false;
        }
        self.title = title;
        self.mark_dirty(now);
        true
    }

    /// Apply backend events, then fire the autosave if its window elapsed.
    ///
    /// While a write is outstanding the autosave stays armed and fires on the
    /// first tick after the reply arrives.
    pub fn tick(&mut self, now: Instant) {
        self.poll_events();
        if self.torn_down || self.write_in_flight.is_some() {
            return;
        }
        if let Some(request) = self.autosave.poll(now) {
            debug!(document_id = self.document_id, "autosave window elapsed");
            self.start_write(WriteKind::Save, request);
        }
    }

    /// Drain and apply every pending backend event.
    ///
    /// # Returns
    /// How many events were applied. After teardown events are drained and
    /// dropped.
    pub fn poll_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.backend.evt_rx.try_recv() {
            if self.torn_down {
                continue;
            }
            self.apply_event(event);
            applied += 1;
        }
        applied
    }

    /// Save now, skipping the debounce window. With a write outstanding the
    /// save is queued and sent as soon as that write completes.
    pub fn save_now(&mut self) -> bool {
        if !self.is_loaded() {
            return false;
        }
        let request = self.autosave.flush().unwrap_or_else(|| self.snapshot());
        self.start_write(WriteKind::Save, request)
    }

    /// Refetch scores from the dedicated scores endpoint.
    pub fn fetch_scores(&mut self) -> bool {
        if !self.is_loaded() {
            return false;
        }
        let seq = self.fence.next();
        if !self.send(CoreCmd::FetchScores {
            seq,
            id: self.document_id,
        }) {
            return false;
        }
        self.score_fetch_seq = Some(seq);
        self.scores.set_loading(true);
        true
    }

    /// Ask the server to rewrite the document following `instruction`.
    ///
    /// # Returns
    /// `false` when the instruction is blank, a rewrite is already running,
    /// or the document is not editable. Nothing is sent in those cases.
    pub fn rewrite(&mut self, instruction: &str) -> bool {
        if !self.is_loaded() || self.rewrite_seq.is_some() {
            return false;
        }
        let Some(instruction) = normalize_instruction(instruction) else {
            self.last_error = Some("Instruction is required".to_string());
            return false;
        };
        let seq = self.fence.next();
        let cmd = CoreCmd::Rewrite {
            seq,
            id: self.document_id,
            instruction: instruction.to_string(),
        };
        self.scores.set_loading(true);
        if !self.send(cmd) {
            self.scores.set_loading(false);
            return false;
        }
        self.rewrite_seq = Some(seq);
        true
    }

    /// Open the history panel and load its entries.
    pub fn open_history(&mut self) -> bool {
        if !self.is_loaded() {
            return false;
        }
        let seq = self.fence.next();
        if !self.send(CoreCmd::LoadHistory {
            seq,
            id: self.document_id,
        }) {
            return false;
        }
        self.history = Some(HistoryPanel::loading());
        self.history_seq = Some(seq);
        true
    }

    pub fn close_history(&mut self) {
        self.history = None;
        self.history_seq = None;
    }

    /// Replace the buffer with a historical snapshot and run the normal
    /// save pipeline. The restore save waits for any write still in flight,
    /// and that write's reply no longer updates scores.
    pub fn restore_version(&mut self, content: impl Into<String>, now: Instant) -> bool {
        if !self.is_loaded() {
            return false;
        }
        self.buffer.set_text(content);
        self.text_barrier = self.fence.next();
        self.close_history();
        self.mark_dirty(now);
        true
    }

    /// Restore history entry `entry_id` from the open panel.
    pub fn restore_entry(&mut self, entry_id: i64, now: Instant) -> bool {
        let Some(content) = self
            .history
            .as_ref()
            .and_then(|panel| panel.entry(entry_id))
            .map(|entry| entry.content.clone())
        else {
            return false;
        };
        self.restore_version(content, now)
    }

    /// Compare the two versions selected in the history panel.
    pub fn compare(&self) -> Option<VersionComparison> {
        self.history
            .as_ref()
            .and_then(|panel| panel.compare(self.buffer.text()))
    }

    /// Stop all work for this document: the pending autosave is dropped and
    /// in-flight requests are aborted. Later events are ignored.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        if self.autosave.cancel() {
            debug!(document_id = self.document_id, "dropped pending autosave on teardown");
        }
        self.queued_write = None;
        let _ = self.backend.cmd_tx.send(CoreCmd::AbortAll);
        self.torn_down = true;
    }

    pub fn document_id(&self) -> DocumentId {
        self.document_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    pub fn buffer(&self) -> &EditorBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut EditorBuffer {
        &mut self.buffer
    }

    pub fn scores(&self) -> &ScoreStore {
        &self.scores
    }

    pub fn save_status(&self) -> SaveStatus {
        self.save_status
    }

    pub fn phase(&self) -> Phase {
        match &self.load {
            LoadState::Failed(_) => return Phase::Error,
            LoadState::Pending(_) => return Phase::Loading,
            LoadState::Loaded => {}
        }
        if self.history.is_some() {
            Phase::ViewingHistory
        } else if self.rewrite_seq.is_some() {
            Phase::Rewriting
        } else if self
            .write_in_flight
            .map_or(false, |write| write.kind == WriteKind::Save)
        {
            Phase::Saving
        } else {
            Phase::Ready
        }
    }

    /// Inline message for a failed initial load.
    pub fn load_error(&self) -> Option<&str> {
        match &self.load {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Most recent user-facing failure from a foreground operation.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether an operation failed authentication and the user must log in.
    pub fn needs_login(&self) -> bool {
        self.needs_login
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Local>> {
        self.last_saved_at
    }

    /// `last saved at` time as `HH:MM:SS`.
    pub fn last_saved_label(&self) -> Option<String> {
        self.last_saved_at
            .map(|saved| saved.format("%H:%M:%S").to_string())
    }

    pub fn history(&self) -> Option<&HistoryPanel> {
        self.history.as_ref()
    }

    pub fn history_mut(&mut self) -> Option<&mut HistoryPanel> {
        self.history.as_mut()
    }

    /// When the pending autosave becomes due.
    pub fn autosave_due_at(&self) -> Option<Instant> {
        self.autosave.due_at()
    }

    /// Whether local changes are not yet confirmed by the server.
    pub fn has_unsaved_changes(&self) -> bool {
        self.save_status != SaveStatus::Saved || self.autosave.is_pending()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

impl Drop for DocumentController {
    fn drop(&mut self) {
        self.teardown();
    }
}
