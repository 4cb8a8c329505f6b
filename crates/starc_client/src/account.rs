//! Per-user account endpoints.

use crate::client::{decode_json, ApiClient, Auth};
use crate::error::ApiError;
use reqwest::Method;
use starc_core::models::stats::UserStats;

impl ApiClient {
    /// `GET /docs/user/stats`.
    pub async fn user_stats(&self) -> Result<UserStats, ApiError> {
        let url = self.endpoint(&["docs", "user", "stats"])?;
        let response = self
            .execute("user_stats", Auth::Bearer, || {
                Ok(self.request(Method::GET, url.clone()))
            })
            .await?;
        decode_json(response).await
    }
}
