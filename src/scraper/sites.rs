// sites.rs
use rust_decimal::Decimal;
use ::scraper::{Html, Selector};

use crate::domain::{parse_price_text, SiteKind};
use crate::scraper::ScraperError;

/// Ordered selector lists for one site. Earlier selectors win.
#[derive(Debug)]
pub struct SiteRules {
    pub title_selectors: &'static [&'static str],
    pub price_selectors: &'static [&'static str],
}

const AMAZON: SiteRules = SiteRules {
    title_selectors: &["span#productTitle", "h1#title", "#productTitle"],
    price_selectors: &[
        "span.a-price-whole",
        "span.a-offscreen",
        "span.a-price span.a-offscreen",
        ".a-price .a-offscreen",
    ],
};

const FLIPKART: SiteRules = SiteRules {
    title_selectors: &["span.B_NuCI", "h1._10Ermw", r#"h1[class*="title"]"#],
    price_selectors: &["div._30jeq3._16Jk6d", "div._1_WHN1", "span._16Jk6d"],
};

pub fn rules_for(site: SiteKind) -> &'static SiteRules {
    match site {
        SiteKind::Amazon => &AMAZON,
        SiteKind::Flipkart => &FLIPKART,
    }
}

// Markers of bot-check interstitials served with a 200.
const BLOCK_MARKERS: &[&str] = &[
    "api-services-support@amazon.com",
    "Enter the characters you see below",
    "/errors/validateCaptcha",
];

/// Pulls `(name, price)` out of a product page using the site's rules.
pub fn extract_product(html: &str, site: SiteKind) -> Result<(String, Decimal), ScraperError> {
    let document = Html::parse_document(html);
    let rules = rules_for(site);

    let name = first_text(&document, rules.title_selectors)?;

    let mut price = None;
    for raw in rules.price_selectors {
        let selector = parse_selector(raw)?;
        if let Some(p) = document
            .select(&selector)
            .map(|el| el.text().collect::<String>())
            .find_map(|text| parse_price_text(&text))
        {
            price = Some(p);
            break;
        }
    }

    match (name, price) {
        (Some(name), Some(price)) => Ok((name, price)),
        _ if BLOCK_MARKERS.iter().any(|m| html.contains(m)) => {
            Err(ScraperError::Blocked("captcha page".into()))
        }
        (None, _) => Err(ScraperError::MissingName),
        (Some(_), None) => Err(ScraperError::MissingPrice),
    }
}

fn first_text(document: &Html, selectors: &[&str]) -> Result<Option<String>, ScraperError> {
    for raw in selectors {
        let selector = parse_selector(raw)?;
        let found = document
            .select(&selector)
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .find(|t| !t.is_empty());
        if found.is_some() {
            return Ok(found);
        }
    }
    Ok(None)
}

fn parse_selector(raw: &str) -> Result<Selector, ScraperError> {
    Selector::parse(raw).map_err(|e| ScraperError::HtmlParse(format!("{raw}: {e}")))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
