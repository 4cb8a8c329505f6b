//! URL helpers for API endpoints.

use crate::error::ApiError;
use reqwest::Url;

/// Parse and normalize the API base URL.
///
/// Trailing slashes are dropped so appended segments never produce `//`.
///
/// # Errors
/// Returns [`ApiError::InvalidUrl`] when `base` is not an absolute URL that
/// can carry path segments.
pub fn parse_base(base: &str) -> Result<Url, ApiError> {
    let trimmed = base.trim();
    let url = Url::parse(trimmed)
        .map_err(|err| ApiError::InvalidUrl(format!("'{}': {}", trimmed, err)))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidUrl(format!(
            "'{}' cannot be used as an API base",
            trimmed
        )));
    }
    Ok(url)
}

/// Append percent-encoded path segments to `base`.
pub fn api_url(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl("API base cannot carry a path".to_string()))?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::{api_url, parse_base};

    #[test]
    fn api_url_encodes_path_segments() {
        let base = parse_base("http://127.0.0.1:2000").expect("base");
        let url = api_url(&base, &["docs", "id/with?reserved#chars"]).expect("url");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:2000/docs/id%2Fwith%3Freserved%23chars"
        );
    }

    #[test]
    fn api_url_appends_to_existing_base_path() {
        let base = parse_base("https://api.example.test/v1/").expect("base");
        let url = api_url(&base, &["docs", "scores", "5"]).expect("url");
        assert_eq!(url.as_str(), "https://api.example.test/v1/docs/scores/5");
    }

    #[test]
    fn parse_base_rejects_non_base_urls() {
        assert!(parse_base("not a url").is_err());
        assert!(parse_base("mailto:someone@example.com").is_err());
    }
}
