// Core structs: Listing and the error types shared across the pipeline
use thiserror::Error;

/// Placeholder stored in any text field the extractor could not find.
pub const SENTINEL: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub title: String,
    pub price: String,
    pub details: String,
    pub link: String,
    pub image_url: Option<String>,
}

impl Listing {
    /// A listing with every field at its fallback value.
    pub fn empty() -> Self {
        Self {
            title: SENTINEL.to_string(),
            price: SENTINEL.to_string(),
            details: SENTINEL.to_string(),
            link: SENTINEL.to_string(),
            image_url: None,
        }
    }

    /// A listing is usable when it has either a title or a link.
    pub fn is_valid(&self) -> bool {
        has_value(&self.title) || has_value(&self.link)
    }
}

fn has_value(field: &str) -> bool {
    let field = field.trim();
    !field.is_empty() && field != SENTINEL
}

/// Falls back to the sentinel for missing or blank text.
pub fn or_sentinel(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => SENTINEL.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("http error: {0}")]
    HttpError(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected status {0}")]
    InvalidResponse(u16),
}

impl From<reqwest::Error> for ScraperError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ScraperError::Timeout
        } else {
            ScraperError::HttpError(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("html parse error: {0}")]
    HtmlParseError(String),
    #[error("json parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),
    #[error("expected a JSON array of items")]
    NotAnArray,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("api error: {0}")]
    ApiError(String),
    #[error("notification endpoint unreachable")]
    Unreachable,
}
