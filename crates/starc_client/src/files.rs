//! PDF export and upload.

use crate::client::{ApiClient, Auth};
use crate::error::ApiError;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use starc_core::models::DocumentId;
use std::path::Path;
use tracing::info;

/// Whether `path` carries a `.pdf` extension (case-insensitive).
pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

impl ApiClient {
    /// `GET /docs/pdf/{id}`: the rendered PDF bytes.
    pub async fn export_pdf(&self, id: DocumentId) -> Result<Vec<u8>, ApiError> {
        let id_segment = id.to_string();
        let url = self.endpoint(&["docs", "pdf", &id_segment])?;
        let response = self
            .execute("export_pdf", Auth::Bearer, || {
                Ok(self.request(Method::GET, url.clone()))
            })
            .await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// `POST /docs/pdf` with the file in multipart field `pdf`.
    pub async fn upload_pdf(&self, path: &Path) -> Result<(), ApiError> {
        if !is_pdf_path(path) {
            return Err(ApiError::BadRequest(
                "Only PDF files can be uploaded".to_string(),
            ));
        }
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("document.pdf")
            .to_string();
        let url = self.endpoint(&["docs", "pdf"])?;
        self.execute("upload_pdf", Auth::Bearer, || {
            let part = Part::bytes(bytes.clone())
                .file_name(file_name.clone())
                .mime_str("application/pdf")?;
            Ok(self
                .request(Method::POST, url.clone())
                .multipart(Form::new().part("pdf", part)))
        })
        .await?;
        info!(file = %file_name, size = bytes.len(), "pdf uploaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::is_pdf_path;
    use std::path::Path;

    #[test]
    fn pdf_extension_check_is_case_insensitive() {
        assert!(is_pdf_path(Path::new("report.pdf")));
        assert!(is_pdf_path(Path::new("REPORT.PDF")));
        assert!(!is_pdf_path(Path::new("report.docx")));
        assert!(!is_pdf_path(Path::new("pdf")));
    }
}
