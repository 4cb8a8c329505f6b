//! Search/list payloads.

use super::DocumentId;
use crate::constants::NO_DOCUMENTS_MESSAGE;
use serde::{Deserialize, Serialize};

/// Query parameters for `GET /api/search`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SearchQuery {
    pub q: String,
    pub page: usize,
    pub limit: usize,
}

impl SearchQuery {
    /// First page of documents whose titles match `q` (blank lists everything).
    pub fn new(q: impl Into<String>, limit: usize) -> Self {
        Self {
            q: q.into().trim().to_string(),
            page: 1,
            limit,
        }
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }
}

/// One row in the document list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub title: String,
    #[serde(default)]
    pub word_count: usize,
}

/// Raw search response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub total_items: Option<usize>,
    #[serde(default)]
    pub total_pages: Option<usize>,
    #[serde(default)]
    pub current_page: Option<usize>,
    #[serde(default)]
    pub results: Option<Vec<DocumentSummary>>,
}

/// Outcome of a search/list request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentListing {
    Documents {
        items: Vec<DocumentSummary>,
        total_items: usize,
        total_pages: usize,
        current_page: usize,
    },
    Empty {
        message: String,
    },
}

impl DocumentListing {
    /// Listing for an empty or `204 No Content` response.
    pub fn empty(message: Option<String>) -> Self {
        Self::Empty {
            message: message.unwrap_or_else(|| NO_DOCUMENTS_MESSAGE.to_string()),
        }
    }

    /// Interpret a search body for the page that was requested.
    pub fn from_response(response: SearchResponse, query: &SearchQuery) -> Self {
        match response.results {
            Some(items) if !items.is_empty() => {
                let total_items = response.total_items.unwrap_or(items.len());
                let total_pages = response
                    .total_pages
                    .unwrap_or_else(|| total_items.div_ceil(query.limit.max(1)));
                Self::Documents {
                    items,
                    total_items,
                    total_pages,
                    current_page: response.current_page.unwrap_or(query.page),
                }
            }
            _ => Self::empty(response.message),
        }
    }

    /// Documents on this page (empty for [`DocumentListing::Empty`]).
    pub fn items(&self) -> &[DocumentSummary] {
        match self {
            Self::Documents { items, .. } => items,
            Self::Empty { .. } => &[],
        }
    }
}
