//! Client side of the rewrite flow.

use starc_client::{ApiClient, ApiError};
use starc_core::models::scores::ScoreSet;
use starc_core::models::DocumentId;
use tracing::{info, warn};

/// Rewritten text plus the scores the server computed for it.
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteOutcome {
    pub text: String,
    pub scores: Option<ScoreSet>,
}

/// Trim an instruction, rejecting blank ones before anything is sent.
pub fn normalize_instruction(instruction: &str) -> Option<&str> {
    let trimmed = instruction.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Sends rewrite instructions and persists accepted results.
#[derive(Clone)]
pub struct RewriteEngine {
    client: ApiClient,
}

impl RewriteEngine {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Ask the server to rewrite document `id` following `instruction`.
    ///
    /// # Errors
    /// Blank instructions fail with a validation error and are not sent;
    /// transport and server failures are returned unchanged.
    pub async fn rewrite(
        &self,
        id: DocumentId,
        instruction: &str,
    ) -> Result<RewriteOutcome, ApiError> {
        let Some(instruction) = normalize_instruction(instruction) else {
            return Err(ApiError::BadRequest("Instruction is required".to_string()));
        };
        let response = self.client.rewrite(id, instruction).await?;
        let scores = response.scores.normalize();
        if scores.is_none() {
            warn!(document_id = id, "rewrite response carried no scores");
        }
        info!(
            document_id = id,
            chars = response.rewritten_text.chars().count(),
            "rewrite received"
        );
        Ok(RewriteOutcome {
            text: response.rewritten_text,
            scores,
        })
    }

    /// Persist rewritten text as the document content.
    ///
    /// Failures are logged here; callers never roll back the text already
    /// shown to the user.
    pub async fn persist(&self, id: DocumentId, text: &str) -> Result<(), ApiError> {
        self.client
            .save_rewrite(id, text)
            .await
            .inspect_err(|err| warn!(document_id = id, error = %err, "saving rewrite failed"))
    }
}
