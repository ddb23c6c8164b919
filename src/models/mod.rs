// src/models/mod.rs

pub mod comment;
pub mod content;
pub mod hero_image;
pub mod inquiry;
pub mod order;
pub mod product;
pub mod user;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use url::Url;
use validator::ValidationError;

/// Page/limit query parameters shared by the paginated listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    /// Number of items to return (default: 20, max: 100).
    pub limit: Option<i64>,
    /// Search keyword for title match.
    pub q: Option<String>,
}

impl PageParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    /// Keyword with surrounding whitespace removed; `None` when blank.
    pub fn keyword(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

/// Envelope for paginated listings.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// Validates an image or attachment reference: an absolute URL or a site path such as
/// `/uploads/a.png`.
pub fn validate_media_path(path: &str) -> Result<(), ValidationError> {
    let site_path = path.starts_with('/') && !path.starts_with("//") && !path.contains("..");
    let web_url = Url::parse(path).is_ok_and(|url| matches!(url.scheme(), "http" | "https"));
    if path.len() > 500 || !(site_path || web_url) {
        return Err(ValidationError::new("invalid_path")
            .with_message(Cow::Borrowed("File path or URL is not valid.")));
    }
    Ok(())
}

/// Like `validate_media_path`, but an empty string is allowed (it clears the field).
pub fn validate_clearable_path(path: &str) -> Result<(), ValidationError> {
    if path.trim().is_empty() {
        return Ok(());
    }
    validate_media_path(path)
}

/// Validates every entry of an image or attachment list.
pub fn validate_media_paths(paths: &[String]) -> Result<(), ValidationError> {
    paths.iter().try_for_each(|path| validate_media_path(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_params_clamp() {
        let params = PageParams {
            page: Some(0),
            limit: Some(500),
            q: Some("  ".to_string()),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 100);
        assert_eq!(params.offset(), 0);
        assert_eq!(params.keyword(), None);

        let params = PageParams {
            page: Some(3),
            limit: None,
            q: Some(" vitamin ".to_string()),
        };
        assert_eq!(params.offset(), 40);
        assert_eq!(params.keyword(), Some("vitamin"));
    }

    #[test]
    fn huge_page_saturates_offset() {
        let params = PageParams {
            page: Some(i64::MAX),
            limit: Some(20),
            q: None,
        };
        assert_eq!(params.offset(), i64::MAX);
    }

    #[test]
    fn media_paths_accept_urls_and_site_paths() {
        assert!(validate_media_path("/uploads/2025/a.png").is_ok());
        assert!(validate_media_path("https://cdn.example.com/a.png").is_ok());
        assert!(validate_media_path("uploads/a.png").is_err());
        assert!(validate_media_path("javascript:alert(1)").is_err());
        assert!(validate_media_path("/uploads/../etc/passwd").is_err());
        assert!(validate_media_paths(&["/a.png".to_string(), "b".to_string()]).is_err());
        assert!(validate_clearable_path("").is_ok());
        assert!(validate_clearable_path("nope").is_err());
    }
}
