//! Document CRUD, search, and scores.

use crate::client::{decode_json, ApiClient, Auth};
use crate::error::ApiError;
use reqwest::{Method, StatusCode};
use starc_core::models::document::{
    CreateDocumentRequest, CreatedDocument, Document, DocumentDetails, UpdateDocumentRequest,
    UpdateDocumentResponse,
};
use starc_core::models::scores::{ScorePayload, ScoreSet};
use starc_core::models::search::{DocumentListing, SearchQuery, SearchResponse};
use starc_core::models::DocumentId;
use tracing::debug;

impl ApiClient {
    /// `GET /api/search`. `204 No Content` and empty results both become
    /// [`DocumentListing::Empty`].
    pub async fn search_documents(&self, query: &SearchQuery) -> Result<DocumentListing, ApiError> {
        let url = self.endpoint(&["api", "search"])?;
        let response = self
            .execute("search", Auth::Bearer, || {
                Ok(self.request(Method::GET, url.clone()).query(query))
            })
            .await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(DocumentListing::empty(None));
        }
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(DocumentListing::empty(None));
        }
        let body: SearchResponse = serde_json::from_slice(&bytes)?;
        Ok(DocumentListing::from_response(body, query))
    }

    /// `POST /docs`. Fields the server does not echo back are filled from
    /// the request.
    pub async fn create_document(&self, title: &str, text: &str) -> Result<Document, ApiError> {
        let body = CreateDocumentRequest {
            title: title.to_string(),
            text: text.to_string(),
        };
        let url = self.endpoint(&["docs"])?;
        let response = self
            .execute("create_document", Auth::Bearer, || {
                Ok(self.request(Method::POST, url.clone()).json(&body))
            })
            .await?;
        let created: CreatedDocument = decode_json(response).await?;
        debug!(document_id = created.id, "document created");
        Ok(Document {
            id: created.id,
            title: created.title.unwrap_or(body.title),
            text: created.text.unwrap_or(body.text),
        })
    }

    /// `GET /docs/{id}`.
    pub async fn get_document(&self, id: DocumentId) -> Result<Document, ApiError> {
        let id_segment = id.to_string();
        let url = self.endpoint(&["docs", &id_segment])?;
        let response = self
            .execute("get_document", Auth::Bearer, || {
                Ok(self.request(Method::GET, url.clone()))
            })
            .await?;
        let details: DocumentDetails = decode_json(response).await?;
        Ok(details.into_document(id))
    }

    /// `PUT /docs/{id}`; the response carries server-recomputed scores.
    pub async fn update_document(
        &self,
        id: DocumentId,
        request: &UpdateDocumentRequest,
    ) -> Result<UpdateDocumentResponse, ApiError> {
        let id_segment = id.to_string();
        let url = self.endpoint(&["docs", &id_segment])?;
        let response = self
            .execute("update_document", Auth::Bearer, || {
                Ok(self.request(Method::PUT, url.clone()).json(request))
            })
            .await?;
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(UpdateDocumentResponse::default());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// `DELETE /docs/{id}`.
    pub async fn delete_document(&self, id: DocumentId) -> Result<(), ApiError> {
        let id_segment = id.to_string();
        let url = self.endpoint(&["docs", &id_segment])?;
        self.execute("delete_document", Auth::Bearer, || {
            Ok(self.request(Method::DELETE, url.clone()))
        })
        .await?;
        Ok(())
    }

    /// `GET /docs/scores/{id}`. `None` when the server has no scores yet.
    pub async fn get_scores(&self, id: DocumentId) -> Result<Option<ScoreSet>, ApiError> {
        let id_segment = id.to_string();
        let url = self.endpoint(&["docs", "scores", &id_segment])?;
        let response = self
            .execute("get_scores", Auth::Bearer, || {
                Ok(self.request(Method::GET, url.clone()))
            })
            .await?;
        let payload: ScorePayload = decode_json(response).await?;
        Ok(payload.normalize())
    }
}
