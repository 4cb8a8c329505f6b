//! Per-user activity statistics.

use serde::{Deserialize, Serialize};

/// Response of `GET /docs/user/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub email: String,
    #[serde(default)]
    pub total_documents: u64,
    #[serde(default)]
    pub total_rewrites: u64,
    /// Estimated minutes saved by rewrites.
    #[serde(default)]
    pub time_saved: f64,
    #[serde(default)]
    pub last_activity: Option<String>,
}
