//! Protocol types for the editor backend worker.

use starc_client::ErrorClass;
use starc_core::models::document::Document;
use starc_core::models::history::HistoryEntry;
use starc_core::models::scores::ScoreSet;
use starc_core::models::DocumentId;

/// Commands issued by the controller for the backend worker to execute.
///
/// Every command that produces a result carries the sequence number captured
/// at dispatch so the controller can discard superseded replies.
#[derive(Debug)]
pub enum CoreCmd {
    /// Fetch the document and its scores in parallel.
    LoadDocument { seq: u64, id: DocumentId },
    /// Fetch the current scores.
    FetchScores { seq: u64, id: DocumentId },
    /// Persist title and text; the reply carries server-recomputed scores.
    SaveDocument {
        seq: u64,
        id: DocumentId,
        title: String,
        text: String,
    },
    /// Ask the server to rewrite the document.
    Rewrite {
        seq: u64,
        id: DocumentId,
        instruction: String,
    },
    /// Persist an accepted rewrite. Failures are reported but not retried.
    SaveRewrite {
        seq: u64,
        id: DocumentId,
        text: String,
    },
    /// Load history snapshots, newest first.
    LoadHistory { seq: u64, id: DocumentId },
    /// Abort every task still in flight.
    AbortAll,
}

/// Which operation a [`CoreEvent::Error`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorSource {
    Load,
    Scores,
    Save,
    Rewrite,
    SaveRewrite,
    History,
    Worker,
}

/// Events produced by the backend worker and polled by the controller.
#[derive(Debug)]
pub enum CoreEvent {
    /// Document fetched; scores are `None` when the score fetch failed or
    /// the server has none yet.
    DocumentLoaded {
        seq: u64,
        document: Document,
        scores: Option<ScoreSet>,
    },
    ScoresFetched {
        seq: u64,
        scores: Option<ScoreSet>,
    },
    /// Save acknowledged with the scores from its response.
    DocumentSaved {
        seq: u64,
        final_scores: Option<ScoreSet>,
        initial_scores: Option<ScoreSet>,
    },
    Rewritten {
        seq: u64,
        text: String,
        scores: Option<ScoreSet>,
    },
    RewriteSaved { seq: u64 },
    HistoryLoaded {
        seq: u64,
        entries: Vec<HistoryEntry>,
    },
    /// An operation failed.
    Error {
        seq: u64,
        source: CoreErrorSource,
        class: ErrorClass,
        message: String,
    },
}
