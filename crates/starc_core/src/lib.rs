//! Core domain library for Starc (config, models, session state, timing helpers).

/// Configuration loading and defaults.
pub mod config;
/// Shared constants used across crates.
pub mod constants;
/// Trailing-edge debounce timer.
pub mod debounce;
/// Process-global environment mutation helpers.
pub mod env;
/// Core error types.
pub mod error;
/// Monotonic request sequencing for stale-response fencing.
pub mod fence;
/// Data models exchanged with the remote API.
pub mod models;
/// Persisted session state (tokens, open document, display settings).
pub mod session;
/// User display settings.
pub mod settings;
/// Text counters and normalization helpers.
pub mod text;
/// Client-side form validation.
pub mod validation;

pub use config::{Config, SaveScoreSource};
pub use constants::{DEFAULT_API_URL, DEFAULT_SAVE_DEBOUNCE_MS};
pub use debounce::Debouncer;
pub use error::CoreError;
pub use fence::RequestFence;
pub use session::{Session, SessionHandle, SessionStore};
