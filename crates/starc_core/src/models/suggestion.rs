//! Rewrite suggestion and chatbot payloads.

use serde::{Deserialize, Serialize};

/// Response of `GET /fix/{id}`: the stored chunk and its server rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionChunk {
    #[serde(default)]
    pub id: Option<i64>,
    pub input_text_chunk: String,
    #[serde(default)]
    pub rewritten_text: Option<String>,
}

/// Body of `POST /docs/chatbot`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub prompt: String,
}

/// Response of `POST /docs/chatbot`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}
