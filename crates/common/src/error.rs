use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("HTML parsing failed: {0}")]
    HtmlParse(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Navigation to {url} timed out after {millis}ms")]
    Timeout { url: String, millis: u128 },

    #[error("Page is closed")]
    PageClosed,

    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Listing fetch failed for {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialize(String),
}

pub type CrawlerResult<T> = Result<T, CrawlerError>;
