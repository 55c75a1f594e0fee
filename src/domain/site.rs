// src/domain/site.rs

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Which extraction ruleset applies to a product URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteKind {
    Amazon,
    Flipkart,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SiteError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("unsupported site: {0}")]
    Unsupported(String),
}

impl SiteKind {
    pub const ALL: [SiteKind; 2] = [SiteKind::Amazon, SiteKind::Flipkart];

    /// Derives the site from the URL host. Short links (`amzn.in`) and
    /// regional domains (`amazon.co.uk`) classify as Amazon.
    pub fn classify(raw_url: &str) -> Result<SiteKind, SiteError> {
        let url = Url::parse(raw_url.trim()).map_err(|e| SiteError::InvalidUrl(e.to_string()))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(SiteError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        let host = url
            .host_str()
            .ok_or_else(|| SiteError::InvalidUrl("missing host".into()))?
            .to_lowercase();

        if host.contains("amazon") || host.contains("amzn") {
            Ok(SiteKind::Amazon)
        } else if host.contains("flipkart") {
            Ok(SiteKind::Flipkart)
        } else {
            Err(SiteError::Unsupported(host))
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SiteKind::Amazon => "amazon",
            SiteKind::Flipkart => "flipkart",
        }
    }
}

impl fmt::Display for SiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SiteKind {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SiteKind::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or(SiteError::Unsupported(wanted))
    }
}
