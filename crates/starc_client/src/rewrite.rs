//! Rewrite, suggestion, and chatbot endpoints.

use crate::client::{decode_json, ApiClient, Auth};
use crate::error::ApiError;
use reqwest::Method;
use starc_core::models::document::{RewriteRequest, RewriteResponse, SaveRewriteRequest};
use starc_core::models::suggestion::{ChatRequest, ChatResponse, SuggestionChunk};
use starc_core::models::DocumentId;

impl ApiClient {
    /// `POST /fix/{id}/rewrite`. Blank instructions are rejected without a
    /// network call.
    pub async fn rewrite(
        &self,
        id: DocumentId,
        instruction: &str,
    ) -> Result<RewriteResponse, ApiError> {
        let prompt = instruction.trim();
        if prompt.is_empty() {
            return Err(ApiError::BadRequest("Instruction is required".to_string()));
        }
        let body = RewriteRequest {
            prompt: prompt.to_string(),
        };
        let id_segment = id.to_string();
        let url = self.endpoint(&["fix", &id_segment, "rewrite"])?;
        let response = self
            .execute("rewrite", Auth::Bearer, || {
                Ok(self.request(Method::POST, url.clone()).json(&body))
            })
            .await?;
        decode_json(response).await
    }

    /// `POST /docs/{id}/save_rewrite`.
    pub async fn save_rewrite(&self, id: DocumentId, rewritten_text: &str) -> Result<(), ApiError> {
        let body = SaveRewriteRequest {
            rewritten_text: rewritten_text.to_string(),
        };
        let id_segment = id.to_string();
        let url = self.endpoint(&["docs", &id_segment, "save_rewrite"])?;
        self.execute("save_rewrite", Auth::Bearer, || {
            Ok(self.request(Method::POST, url.clone()).json(&body))
        })
        .await?;
        Ok(())
    }

    /// `GET /fix/{id}`.
    pub async fn list_suggestions(&self, id: DocumentId) -> Result<Vec<SuggestionChunk>, ApiError> {
        let id_segment = id.to_string();
        let url = self.endpoint(&["fix", &id_segment])?;
        let response = self
            .execute("list_suggestions", Auth::Bearer, || {
                Ok(self.request(Method::GET, url.clone()))
            })
            .await?;
        let value: serde_json::Value = decode_json(response).await?;
        // Single-chunk documents come back as a bare object.
        Ok(match value {
            serde_json::Value::Array(_) => serde_json::from_value(value)?,
            serde_json::Value::Null => Vec::new(),
            other => vec![serde_json::from_value(other)?],
        })
    }

    /// `PUT /fix/{id}/suggestions/{sid}`.
    pub async fn apply_suggestion(&self, id: DocumentId, suggestion: i64) -> Result<(), ApiError> {
        self.suggestion_action("apply_suggestion", Method::PUT, id, suggestion)
            .await
    }

    /// `DELETE /fix/{id}/suggestions/{sid}`.
    pub async fn delete_suggestion(&self, id: DocumentId, suggestion: i64) -> Result<(), ApiError> {
        self.suggestion_action("delete_suggestion", Method::DELETE, id, suggestion)
            .await
    }

    /// `PUT /fix/{id}/reset`: revert the chunk to its original text.
    pub async fn reset_suggestion(&self, id: DocumentId) -> Result<(), ApiError> {
        let id_segment = id.to_string();
        let url = self.endpoint(&["fix", &id_segment, "reset"])?;
        self.execute("reset_suggestion", Auth::Bearer, || {
            Ok(self.request(Method::PUT, url.clone()))
        })
        .await?;
        Ok(())
    }

    async fn suggestion_action(
        &self,
        action: &'static str,
        method: Method,
        id: DocumentId,
        suggestion: i64,
    ) -> Result<(), ApiError> {
        let id_segment = id.to_string();
        let suggestion_segment = suggestion.to_string();
        let url = self.endpoint(&["fix", &id_segment, "suggestions", &suggestion_segment])?;
        self.execute(action, Auth::Bearer, || {
            Ok(self.request(method.clone(), url.clone()))
        })
        .await?;
        Ok(())
    }

    /// `POST /docs/chatbot`.
    pub async fn chat(&self, prompt: &str) -> Result<String, ApiError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ApiError::BadRequest("Prompt is required".to_string()));
        }
        let body = ChatRequest {
            prompt: prompt.to_string(),
        };
        let url = self.endpoint(&["docs", "chatbot"])?;
        let response = self
            .execute("chat", Auth::Bearer, || {
                Ok(self.request(Method::POST, url.clone()).json(&body))
            })
            .await?;
        let reply: ChatResponse = decode_json(response).await?;
        Ok(reply.response)
    }
}
