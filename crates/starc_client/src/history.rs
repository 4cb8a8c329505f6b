//! Document history snapshots.

use crate::client::{decode_json, ApiClient, Auth};
use crate::error::ApiError;
use reqwest::Method;
use starc_core::models::history::{sort_newest_first, CreateHistoryRequest, HistoryEntry};
use starc_core::models::DocumentId;

impl ApiClient {
    /// `GET /docs/{id}/history`, newest first.
    pub async fn get_history(&self, id: DocumentId) -> Result<Vec<HistoryEntry>, ApiError> {
        let id_segment = id.to_string();
        let url = self.endpoint(&["docs", &id_segment, "history"])?;
        let response = self
            .execute("get_history", Auth::Bearer, || {
                Ok(self.request(Method::GET, url.clone()))
            })
            .await?;
        let mut entries: Vec<HistoryEntry> = decode_json(response).await?;
        sort_newest_first(&mut entries);
        Ok(entries)
    }

    /// `POST /docs/{id}/history`: record a snapshot of `content`.
    pub async fn post_history(&self, id: DocumentId, content: &str) -> Result<(), ApiError> {
        let body = CreateHistoryRequest {
            content: content.to_string(),
        };
        let id_segment = id.to_string();
        let url = self.endpoint(&["docs", &id_segment, "history"])?;
        self.execute("post_history", Auth::Bearer, || {
            Ok(self.request(Method::POST, url.clone()).json(&body))
        })
        .await?;
        Ok(())
    }
}
