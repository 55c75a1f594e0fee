use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::SiteKind;

/// A successful extraction: both fields are always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapedProduct {
    pub name: String,
    pub price: Decimal,
    pub site: SiteKind,
    /// Which strategy produced it.
    pub strategy: &'static str,
}

/// Result of running one strategy in isolation (diagnostics only).
#[derive(Debug, Clone, Serialize)]
pub struct StrategyOutcome {
    pub strategy: &'static str,
    pub product: Option<ScrapedProduct>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScrapeDiagnosis {
    pub url: String,
    pub site: Option<SiteKind>,
    pub outcomes: Vec<StrategyOutcome>,
    /// First strategy in preference order that succeeded.
    pub recommended: Option<&'static str>,
    pub error: Option<String>,
}
