// scraper_error.rs

/// Anything that stops a scrape from yielding both a name and a price.
/// The cycle treats every variant as a transient scrape failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScraperError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Unsupported site: {0}")]
    UnsupportedSite(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP status {0}")]
    HttpStatus(u16),
    #[error("Timed out")]
    Timeout,
    #[error("Blocked by site: {0}")]
    Blocked(String),
    #[error("HTML parse error: {0}")]
    HtmlParse(String),
    #[error("Product name not found")]
    MissingName,
    #[error("Price not found")]
    MissingPrice,
    #[error("Strategy not configured: {0}")]
    Config(String),
    #[error("All strategies failed: {0}")]
    AllStrategiesFailed(String),
}

impl ScraperError {
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ScraperError::Timeout
        } else if let Some(status) = e.status() {
            ScraperError::HttpStatus(status.as_u16())
        } else {
            ScraperError::Network(e.to_string())
        }
    }
}

impl From<crate::domain::site::SiteError> for ScraperError {
    fn from(e: crate::domain::site::SiteError) -> Self {
        use crate::domain::site::SiteError;
        match e {
            SiteError::InvalidUrl(msg) => ScraperError::InvalidUrl(msg),
            SiteError::Unsupported(host) => ScraperError::UnsupportedSite(host),
        }
    }
}
