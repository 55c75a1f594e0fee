// src/tests/scraper_tests.rs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::SiteKind;
use crate::scraper::sites::extract_product;
use crate::scraper::strategies::{ExtractionStrategy, RenderedHtmlStrategy};
use crate::scraper::models::ScrapedProduct;
use crate::scraper::{PriceSource, Scraper, ScraperError};
use crate::tests::utils::dec;

const AMAZON_PAGE: &str = r#"
<html><body>
  <span id="productTitle">
      Acme   Noise Cancelling Headphones
  </span>
  <span class="a-price"><span class="a-offscreen">₹4,999.00</span></span>
  <span class="a-price-whole">4,999.</span>
</body></html>
"#;

const FLIPKART_PAGE: &str = r#"
<html><body>
  <span class="B_NuCI">Acme Phone (Blue, 128 GB)</span>
  <div class="_30jeq3 _16Jk6d">₹12,499</div>
</body></html>
"#;

#[test]
fn extracts_amazon_title_and_price() {
    let (name, price) = extract_product(AMAZON_PAGE, SiteKind::Amazon).unwrap();
    assert_eq!(name, "Acme Noise Cancelling Headphones");
    assert_eq!(price, dec("4999"));
}

#[test]
fn extracts_flipkart_title_and_price() {
    let (name, price) = extract_product(FLIPKART_PAGE, SiteKind::Flipkart).unwrap();
    assert_eq!(name, "Acme Phone (Blue, 128 GB)");
    assert_eq!(price, dec("12499"));
}

#[test]
fn rupee_abbreviation_does_not_shift_the_decimal_point() {
    let page = r#"<html><body>
      <span class="B_NuCI">Phone</span>
      <div class="_30jeq3 _16Jk6d">Rs. 1,299</div>
    </body></html>"#;
    let (_, price) = extract_product(page, SiteKind::Flipkart).unwrap();
    assert_eq!(price, dec("1299"));
}

#[test]
fn falls_through_to_later_price_selectors() {
    let page = r#"<h1 id="title">Widget</h1>
        <span class="a-price-whole"></span>
        <span class="a-offscreen">₹1,050.00</span>"#;
    let (name, price) = extract_product(page, SiteKind::Amazon).unwrap();
    assert_eq!(name, "Widget");
    assert_eq!(price, dec("1050"));
}

#[test]
fn missing_fields_are_reported() {
    let no_price = r#"<span id="productTitle">Widget</span>"#;
    assert_eq!(
        extract_product(no_price, SiteKind::Amazon).unwrap_err(),
        ScraperError::MissingPrice
    );

    let no_name = r#"<span class="a-offscreen">₹10</span>"#;
    assert_eq!(
        extract_product(no_name, SiteKind::Amazon).unwrap_err(),
        ScraperError::MissingName
    );
}

#[test]
fn captcha_page_is_blocked() {
    let page = r#"<form action="/errors/validateCaptcha">Enter the characters you see below</form>"#;
    assert!(matches!(
        extract_product(page, SiteKind::Amazon),
        Err(ScraperError::Blocked(_))
    ));
}

#[test]
fn rendered_strategy_without_key_is_a_config_failure() {
    let s = RenderedHtmlStrategy::new("test-agent", None).unwrap();
    let err = s
        .attempt("https://www.amazon.in/dp/X", SiteKind::Amazon, Duration::from_secs(1))
        .unwrap_err();
    assert!(matches!(err, ScraperError::Config(_)));
}

/// Strategy that answers from a canned result and counts calls.
struct Canned {
    name: &'static str,
    result: Result<&'static str, ScraperError>,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl ExtractionStrategy for Canned {
    fn name(&self) -> &'static str {
        self.name
    }

    fn attempt(
        &self,
        _url: &str,
        site: SiteKind,
        _budget: Duration,
    ) -> Result<ScrapedProduct, ScraperError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        self.result.clone().map(|p| ScrapedProduct {
            name: "Widget".into(),
            price: dec(p),
            site,
            strategy: self.name,
        })
    }
}

fn canned(
    name: &'static str,
    result: Result<&'static str, ScraperError>,
    delay: Duration,
) -> (Box<dyn ExtractionStrategy>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    (
        Box::new(Canned {
            name,
            result,
            delay,
            calls: Arc::clone(&calls),
        }),
        calls,
    )
}

#[test]
fn first_successful_strategy_wins() {
    let (a, a_calls) = canned("static-html", Ok("100"), Duration::ZERO);
    let (b, b_calls) = canned("rendered-html", Ok("200"), Duration::ZERO);
    let scraper = Scraper::new(vec![a, b]);

    let p = scraper
        .fetch("https://www.amazon.in/dp/X", SiteKind::Amazon, Duration::from_secs(5))
        .unwrap();

    assert_eq!(p.strategy, "static-html");
    assert_eq!(p.price, dec("100"));
    assert_eq!(a_calls.load(Ordering::SeqCst), 1);
    assert_eq!(b_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn falls_back_to_the_next_strategy() {
    let (a, _) = canned("static-html", Err(ScraperError::MissingPrice), Duration::ZERO);
    let (b, _) = canned("rendered-html", Ok("200"), Duration::ZERO);
    let scraper = Scraper::new(vec![a, b]);

    let p = scraper
        .fetch("https://www.amazon.in/dp/X", SiteKind::Amazon, Duration::from_secs(5))
        .unwrap();
    assert_eq!(p.strategy, "rendered-html");
}

#[test]
fn all_strategies_failing_is_reported_together() {
    let (a, _) = canned("static-html", Err(ScraperError::HttpStatus(503)), Duration::ZERO);
    let (b, _) = canned("rendered-html", Err(ScraperError::MissingPrice), Duration::ZERO);
    let scraper = Scraper::new(vec![a, b]);

    let err = scraper
        .fetch("https://www.amazon.in/dp/X", SiteKind::Amazon, Duration::from_secs(5))
        .unwrap_err();
    match err {
        ScraperError::AllStrategiesFailed(msg) => {
            assert!(msg.contains("static-html"));
            assert!(msg.contains("rendered-html"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn budget_is_shared_across_strategies() {
    let (a, _) = canned(
        "static-html",
        Err(ScraperError::MissingPrice),
        Duration::from_millis(60),
    );
    let (b, b_calls) = canned("rendered-html", Ok("200"), Duration::ZERO);
    let scraper = Scraper::new(vec![a, b]);

    let err = scraper
        .fetch("https://www.amazon.in/dp/X", SiteKind::Amazon, Duration::from_millis(20))
        .unwrap_err();

    assert_eq!(err, ScraperError::Timeout);
    assert_eq!(b_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn diagnose_runs_every_strategy_and_recommends_the_first_success() {
    let (a, _) = canned("static-html", Err(ScraperError::MissingPrice), Duration::ZERO);
    let (b, _) = canned("rendered-html", Ok("200"), Duration::ZERO);
    let scraper = Scraper::new(vec![a, b]);

    let d = scraper.diagnose("https://www.flipkart.com/x/p/itm1", Duration::from_secs(5));

    assert_eq!(d.site, Some(SiteKind::Flipkart));
    assert_eq!(d.outcomes.len(), 2);
    assert!(d.outcomes[0].error.is_some());
    assert_eq!(d.recommended, Some("rendered-html"));
    assert_eq!(scraper.strategy_names(), vec!["static-html", "rendered-html"]);
}

#[test]
fn diagnose_rejects_unsupported_sites() {
    let (a, calls) = canned("static-html", Ok("1"), Duration::ZERO);
    let scraper = Scraper::new(vec![a]);

    let d = scraper.diagnose("https://shop.example.com/item", Duration::from_secs(5));

    assert!(d.site.is_none());
    assert!(d.error.is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
