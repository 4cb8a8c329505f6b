//! Data models exchanged with the remote document API.

/// Authentication payloads.
pub mod auth;
/// Document CRUD payloads.
pub mod document;
/// Document history snapshots.
pub mod history;
/// Score payloads and the normalized score set.
pub mod scores;
/// Search/list payloads.
pub mod search;
/// Per-user activity statistics.
pub mod stats;
/// Rewrite suggestions and chatbot payloads.
pub mod suggestion;


use serde::{Deserialize, Serialize};

/// Server-assigned document identifier.
pub type DocumentId = i64;

/// Generic `{ "message": ... }` body returned by many endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
}
