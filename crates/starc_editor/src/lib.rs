//! Editor synchronization loop for Starc documents.
//!
//! A [`DocumentController`] owns the editor buffer and a handle to the shared
//! [`ScoreStore`]. Network work runs on a background worker (see
//! [`backend`]) and results flow back as events the controller applies on
//! each tick.

pub mod backend;
/// Editor text buffer and counters.
pub mod buffer;
/// Document page controller.
pub mod controller;
/// History panel and version compare.
pub mod history;
/// Rewrite engine.
pub mod rewrite;
/// Observable score store.
pub mod scores;

pub use backend::{spawn_backend, BackendHandle, CoreCmd, CoreEvent};
pub use buffer::{CountMode, EditorBuffer};
pub use controller::{ControllerSettings, DocumentController, InitialData, Phase, SaveStatus};
pub use history::{HistoryPanel, VersionComparison, VersionRef};
pub use rewrite::{RewriteEngine, RewriteOutcome};
pub use scores::{ScoreState, ScoreStore};
