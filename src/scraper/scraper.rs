// scraper.rs
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::domain::SiteKind;
use crate::scraper::models::{ScrapeDiagnosis, ScrapedProduct, StrategyOutcome};
use crate::scraper::strategies::{ExtractionStrategy, RenderedHtmlStrategy, StaticHtmlStrategy};
use crate::scraper::ScraperError;

/// What the price-check cycle needs from a scraper. Blocking; must return
/// within `timeout`.
pub trait PriceSource: Send + Sync {
    fn fetch(
        &self,
        url: &str,
        site: SiteKind,
        timeout: Duration,
    ) -> Result<ScrapedProduct, ScraperError>;

    /// Runs every strategy on its own, for the diagnostics page.
    fn diagnose(&self, url: &str, timeout: Duration) -> ScrapeDiagnosis;

    /// Strategy names in the order they are tried.
    fn strategy_names(&self) -> Vec<&'static str>;
}

/// Ordered strategy list; the first strategy to yield a name and a price
/// wins.
pub struct Scraper {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl Scraper {
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Static parse first, rendered page second.
    pub fn from_config(config: &Config) -> Result<Self, ScraperError> {
        Ok(Self::new(vec![
            Box::new(StaticHtmlStrategy::new(&config.user_agent)?),
            Box::new(RenderedHtmlStrategy::new(
                &config.user_agent,
                config.render_api_key.clone(),
            )?),
        ]))
    }
}

impl PriceSource for Scraper {
    fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    fn fetch(
        &self,
        url: &str,
        site: SiteKind,
        timeout: Duration,
    ) -> Result<ScrapedProduct, ScraperError> {
        let deadline = Instant::now() + timeout;
        let mut failures = Vec::new();

        for strategy in &self.strategies {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                tracing::warn!(url, strategy = strategy.name(), "scrape budget exhausted");
                return Err(ScraperError::Timeout);
            }

            let start = Instant::now();
            match strategy.attempt(url, site, remaining) {
                Ok(product) => {
                    tracing::debug!(
                        url,
                        strategy = strategy.name(),
                        elapsed = ?start.elapsed(),
                        price = %product.price,
                        "scrape succeeded"
                    );
                    return Ok(product);
                }
                Err(e) => {
                    tracing::info!(url, strategy = strategy.name(), error = %e, "strategy failed, falling back");
                    failures.push((strategy.name(), e));
                }
            }
        }

        if Instant::now() >= deadline
            || failures
                .last()
                .is_some_and(|(_, e)| *e == ScraperError::Timeout)
        {
            return Err(ScraperError::Timeout);
        }

        let summary = failures
            .iter()
            .map(|(name, e)| format!("{name}: {e}"))
            .collect::<Vec<_>>()
            .join("; ");
        Err(ScraperError::AllStrategiesFailed(summary))
    }

    fn diagnose(&self, url: &str, timeout: Duration) -> ScrapeDiagnosis {
        let site = match SiteKind::classify(url) {
            Ok(site) => site,
            Err(e) => {
                return ScrapeDiagnosis {
                    url: url.to_string(),
                    site: None,
                    outcomes: Vec::new(),
                    recommended: None,
                    error: Some(ScraperError::from(e).to_string()),
                }
            }
        };

        let outcomes: Vec<StrategyOutcome> = self
            .strategies
            .iter()
            .map(|s| match s.attempt(url, site, timeout) {
                Ok(product) => StrategyOutcome {
                    strategy: s.name(),
                    product: Some(product),
                    error: None,
                },
                Err(e) => StrategyOutcome {
                    strategy: s.name(),
                    product: None,
                    error: Some(e.to_string()),
                },
            })
            .collect();

        let recommended = outcomes
            .iter()
            .find(|o| o.product.is_some())
            .map(|o| o.strategy);

        ScrapeDiagnosis {
            url: url.to_string(),
            site: Some(site),
            outcomes,
            recommended,
            error: None,
        }
    }
}
