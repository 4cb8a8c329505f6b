//! Document payloads.

use super::scores::ScorePayload;
use super::DocumentId;
use serde::{Deserialize, Serialize};

/// Client-side cached copy of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub text: String,
}

/// Body of `POST /docs`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateDocumentRequest {
    pub title: String,
    pub text: String,
}

/// Response of `POST /docs`.
///
/// Older servers answer with `document_id` and no echo of title/text.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedDocument {
    #[serde(alias = "document_id")]
    pub id: DocumentId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Response of `GET /docs/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentDetails {
    #[serde(default)]
    pub id: Option<DocumentId>,
    pub title: String,
    #[serde(alias = "text_chunk", alias = "sentences_combined", default)]
    pub text: String,
    #[serde(default)]
    pub word_count: Option<usize>,
}

impl DocumentDetails {
    /// Resolve into a [`Document`], using `requested` when the body omits an id.
    pub fn into_document(self, requested: DocumentId) -> Document {
        Document {
            id: self.id.unwrap_or(requested),
            title: self.title,
            text: self.text,
        }
    }
}

/// Body of `PUT /docs/{id}`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UpdateDocumentRequest {
    pub title: String,
    pub text: String,
}

/// Response of `PUT /docs/{id}`; the server recomputes scores on save.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDocumentResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub document_id: Option<DocumentId>,
    #[serde(default)]
    pub initial_scores: Option<ScorePayload>,
    #[serde(default)]
    pub final_scores: Option<ScorePayload>,
}

/// Body of `POST /fix/{id}/rewrite`.
#[derive(Debug, Clone, Serialize)]
pub struct RewriteRequest {
    pub prompt: String,
}

/// Response of `POST /fix/{id}/rewrite`.
#[derive(Debug, Clone, Deserialize)]
pub struct RewriteResponse {
    pub rewritten_text: String,
    pub scores: ScorePayload,
}

/// Body of `POST /docs/{id}/save_rewrite`.
#[derive(Debug, Clone, Serialize)]
pub struct SaveRewriteRequest {
    pub rewritten_text: String,
}
