// strategies.rs
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::SiteKind;
use crate::scraper::models::ScrapedProduct;
use crate::scraper::sites::{extract_product, rules_for};
use crate::scraper::ScraperError;

/// One way of turning a product URL into a name and a price.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Must give up within `budget`.
    fn attempt(
        &self,
        url: &str,
        site: SiteKind,
        budget: Duration,
    ) -> Result<ScrapedProduct, ScraperError>;
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(REFERER, HeaderValue::from_static("https://www.google.com/"));
    headers
}

fn build_client(user_agent: &str) -> Result<Client, ScraperError> {
    Client::builder()
        .user_agent(user_agent)
        .default_headers(browser_headers())
        .build()
        .map_err(|e| ScraperError::Network(e.to_string()))
}

fn to_product(
    html: &str,
    site: SiteKind,
    strategy: &'static str,
) -> Result<ScrapedProduct, ScraperError> {
    let (name, price) = extract_product(html, site)?;
    Ok(ScrapedProduct {
        name,
        price,
        site,
        strategy,
    })
}

/// Plain GET of the page, parsed as served.
pub struct StaticHtmlStrategy {
    client: Client,
}

impl StaticHtmlStrategy {
    pub fn new(user_agent: &str) -> Result<Self, ScraperError> {
        Ok(Self {
            client: build_client(user_agent)?,
        })
    }
}

impl ExtractionStrategy for StaticHtmlStrategy {
    fn name(&self) -> &'static str {
        "static-html"
    }

    fn attempt(
        &self,
        url: &str,
        site: SiteKind,
        budget: Duration,
    ) -> Result<ScrapedProduct, ScraperError> {
        let resp = self
            .client
            .get(url)
            .timeout(budget)
            .send()
            .map_err(ScraperError::from_reqwest)?;

        let status = resp.status();
        if status.as_u16() == 503 || status.as_u16() == 429 {
            return Err(ScraperError::Blocked(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(ScraperError::HttpStatus(status.as_u16()));
        }

        let html = resp.text().map_err(ScraperError::from_reqwest)?;
        to_product(&html, site, self.name())
    }
}

const RENDER_ENDPOINT: &str = "https://api.zenrows.com/v1/";

/// Fetches the page through a JavaScript-rendering proxy so client-side
/// prices are present in the markup.
pub struct RenderedHtmlStrategy {
    client: Client,
    api_key: Option<String>,
}

impl RenderedHtmlStrategy {
    pub fn new(user_agent: &str, api_key: Option<String>) -> Result<Self, ScraperError> {
        Ok(Self {
            client: build_client(user_agent)?,
            api_key,
        })
    }
}

impl ExtractionStrategy for RenderedHtmlStrategy {
    fn name(&self) -> &'static str {
        "rendered-html"
    }

    fn attempt(
        &self,
        url: &str,
        site: SiteKind,
        budget: Duration,
    ) -> Result<ScrapedProduct, ScraperError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ScraperError::Config("ZENROWS_API_KEY not set".into()))?;

        let mut params = HashMap::new();
        params.insert("url", url.to_string());
        params.insert("apikey", api_key.to_string());
        params.insert("js_render", "true".to_string());
        params.insert("original_status", "true".to_string());
        if let Some(first) = rules_for(site).price_selectors.first() {
            params.insert("wait_for", first.to_string());
        }

        let resp = self
            .client
            .get(RENDER_ENDPOINT)
            .query(&params)
            .timeout(budget)
            .send()
            .map_err(ScraperError::from_reqwest)?;

        let status = resp.status();
        let text = resp.text().map_err(ScraperError::from_reqwest)?;

        if !status.is_success() {
            return Err(ScraperError::Network(format!(
                "render API HTTP {status}: {}",
                text.chars().take(200).collect::<String>()
            )));
        }

        // The API reports its own failures as a JSON object with a `code`.
        if text.starts_with('{') {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(&text) {
                if json.get("code").is_some() {
                    return Err(ScraperError::Network(format!("render API error: {json}")));
                }
            }
        }

        to_product(&text, site, self.name())
    }
}
