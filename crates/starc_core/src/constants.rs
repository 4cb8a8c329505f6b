//! Shared constants used across Starc crates.

/// Default base URL for the remote document API.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:2000";

/// Default quiet window before an edit is saved, in milliseconds.
pub const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 1_000;

/// Default request timeout for API calls, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default page size for document search/list requests.
pub const DEFAULT_SEARCH_LIMIT: usize = 12;

/// Session file name under the config directory.
pub const SESSION_FILE_NAME: &str = "session.json";

/// Message shown when a search/list request yields no documents.
pub const NO_DOCUMENTS_MESSAGE: &str = "No documents found";

/// Number of characters shown in a history entry preview.
pub const HISTORY_PREVIEW_CHARS: usize = 200;

/// Minimum password length accepted by registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Upper bound of a score value.
pub const SCORE_MAX: f64 = 100.0;
