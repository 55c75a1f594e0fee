// src/tests/utils.rs
//! Scratch databases and scripted fakes for the scraper/notifier seams.

use std::collections::{HashMap, HashSet, VecDeque};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use tempfile::TempDir;

use crate::config::Config;
use crate::context::AppContext;
use crate::db::{init_db, CheckWrite, Database, PriceStore};
use crate::domain::{NewProduct, Product, SiteKind};
use crate::errors::AppError;
use crate::mailer::{DropAlert, DropNotifier, EmailSelfTest};
use crate::scraper::models::{ScrapedProduct, StrategyOutcome};
use crate::scraper::{PriceSource, ScrapeDiagnosis, ScraperError};

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// A fresh database file inside its own temp dir. Keep the `TempDir` alive
/// for as long as the database is used.
pub fn test_db() -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(dir.path().join("test.sqlite3"));
    init_db(&db).unwrap_or_else(|e| panic!("Database initialization failed: {e}"));
    (dir, db)
}

pub fn amazon_url(n: u32) -> String {
    format!("https://www.amazon.in/dp/TEST{n:04}")
}

/// Inserts a product and, when `current` is given, records it as the first
/// observation.
pub fn seed_product(db: &Database, url: &str, threshold: &str, current: Option<&str>) -> i64 {
    let id = db
        .with_conn(|conn| {
            crate::db::products::upsert_product(
                conn,
                &NewProduct {
                    name: format!("Product at {url}"),
                    url: url.to_string(),
                    threshold_price: dec(threshold),
                    site: SiteKind::classify(url).unwrap(),
                    check_interval_secs: 3600,
                },
                Utc::now(),
            )
        })
        .unwrap();

    if let Some(price) = current {
        db.record_check(&CheckWrite {
            product_id: id,
            price: dec(price),
            at: Utc::now(),
            notification: None,
        })
        .unwrap();
    }
    id
}

pub fn count(db: &Database, sql: &str) -> i64 {
    db.with_conn(|conn| Ok(conn.query_row(sql, [], |r| r.get::<_, i64>(0))?))
        .unwrap()
}

pub fn observations_for(db: &Database, product_id: i64) -> i64 {
    db.with_conn(|conn| crate::db::price_history::count_observations(conn, product_id))
        .unwrap()
}

pub fn notifications_for(db: &Database, product_id: i64) -> Vec<crate::domain::NotificationEvent> {
    db.with_conn(|conn| crate::db::notifications::get_notifications_for_product(conn, product_id))
        .unwrap()
}

/// Answers per URL from a script. The last scripted answer repeats once the
/// script runs out; unknown URLs fail with `MissingPrice`.
#[derive(Default)]
pub struct FakeScraper {
    scripts: Mutex<HashMap<String, VecDeque<Result<Decimal, ScraperError>>>>,
    pub calls: AtomicUsize,
    delay: Mutex<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeScraper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, url: &str, answers: Vec<Result<Decimal, ScraperError>>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(url.to_string(), answers.into());
    }

    pub fn price(&self, url: &str, price: &str) {
        self.script(url, vec![Ok(dec(price))]);
    }

    pub fn fail(&self, url: &str, err: ScraperError) {
        self.script(url, vec![Err(err)]);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every fetch sleeps this long before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    /// Most fetches ever running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_answer(&self, url: &str) -> Result<Decimal, ScraperError> {
        let mut scripts = self.scripts.lock().unwrap();
        let queue = scripts.get_mut(url).ok_or(ScraperError::MissingPrice)?;
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap_or(Err(ScraperError::MissingPrice))
        }
    }
}

impl PriceSource for FakeScraper {
    fn fetch(
        &self,
        url: &str,
        site: SiteKind,
        _timeout: Duration,
    ) -> Result<ScrapedProduct, ScraperError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        let answer = self.next_answer(url);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        answer.map(|price| ScrapedProduct {
            name: "Scraped Widget".to_string(),
            price,
            site,
            strategy: "fake",
        })
    }

    fn diagnose(&self, url: &str, timeout: Duration) -> ScrapeDiagnosis {
        let site = SiteKind::classify(url).ok();
        let result = site.map(|s| self.fetch(url, s, timeout));
        let outcome = match result {
            Some(Ok(p)) => StrategyOutcome {
                strategy: "fake",
                product: Some(p),
                error: None,
            },
            Some(Err(e)) => StrategyOutcome {
                strategy: "fake",
                product: None,
                error: Some(e.to_string()),
            },
            None => {
                return ScrapeDiagnosis {
                    url: url.to_string(),
                    site: None,
                    outcomes: Vec::new(),
                    recommended: None,
                    error: Some("Unsupported site".into()),
                }
            }
        };
        let recommended = outcome.product.as_ref().map(|_| "fake");
        ScrapeDiagnosis {
            url: url.to_string(),
            site,
            outcomes: vec![outcome],
            recommended,
            error: None,
        }
    }

    fn strategy_names(&self) -> Vec<&'static str> {
        vec!["fake"]
    }
}

/// Records every alert; succeeds or fails as told.
pub struct FakeNotifier {
    succeed: AtomicBool,
    pub alerts: Mutex<Vec<(String, Decimal, Decimal)>>,
    pub summaries: Mutex<Vec<usize>>,
}

impl FakeNotifier {
    pub fn new(succeed: bool) -> Self {
        Self {
            succeed: AtomicBool::new(succeed),
            alerts: Mutex::new(Vec::new()),
            summaries: Mutex::new(Vec::new()),
        }
    }

    pub fn set_succeed(&self, ok: bool) {
        self.succeed.store(ok, Ordering::SeqCst);
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.lock().unwrap().len()
    }
}

impl DropNotifier for FakeNotifier {
    fn send_drop_alert(&self, alert: &DropAlert<'_>) -> bool {
        self.alerts.lock().unwrap().push((
            alert.product_name.to_string(),
            alert.old_price,
            alert.new_price,
        ));
        self.succeed.load(Ordering::SeqCst)
    }

    fn send_summary(&self, alerts: &[DropAlert<'_>]) -> bool {
        self.summaries.lock().unwrap().push(alerts.len());
        self.succeed.load(Ordering::SeqCst)
    }

    fn self_test(&self) -> EmailSelfTest {
        let ok = self.succeed.load(Ordering::SeqCst);
        EmailSelfTest {
            config_valid: true,
            connection_ok: ok,
            auth_ok: ok,
            test_sent: ok,
            error: (!ok).then(|| "connection refused".to_string()),
        }
    }
}

/// Delegates to a real database but refuses to write checks for chosen
/// products, to record send results, or to read anything at all.
pub struct FailingStore<'a> {
    pub inner: &'a Database,
    pub fail_writes_for: HashSet<i64>,
    pub fail_marks: bool,
    pub unreachable: bool,
}

impl<'a> FailingStore<'a> {
    pub fn new(inner: &'a Database) -> Self {
        Self {
            inner,
            fail_writes_for: HashSet::new(),
            fail_marks: false,
            unreachable: false,
        }
    }
}

impl PriceStore for FailingStore<'_> {
    fn get_active_products(&self) -> Result<Vec<Product>, AppError> {
        if self.unreachable {
            return Err(AppError::Db("database is locked".into()));
        }
        self.inner.get_active_products()
    }

    fn get_product(&self, product_id: i64) -> Result<Option<Product>, AppError> {
        self.inner.get_product(product_id)
    }

    fn record_check(&self, write: &CheckWrite) -> Result<Option<i64>, AppError> {
        if self.fail_writes_for.contains(&write.product_id) {
            return Err(AppError::Db("disk I/O error".into()));
        }
        self.inner.record_check(write)
    }

    fn mark_notification_sent(&self, event_id: i64, success: bool) -> Result<(), AppError> {
        if self.fail_marks {
            return Err(AppError::Db("database is locked".into()));
        }
        self.inner.mark_notification_sent(event_id, success)
    }
}

/// Test config: no politeness delay, short timeout.
pub fn test_config() -> Config {
    Config {
        product_delay: Duration::ZERO,
        request_timeout: Duration::from_secs(5),
        currency_symbol: "₹".to_string(),
        ..Config::default()
    }
}

pub struct TestApp {
    pub _dir: TempDir,
    pub ctx: AppContext,
    pub scraper: Arc<FakeScraper>,
    pub notifier: Arc<FakeNotifier>,
}

pub fn test_app() -> TestApp {
    test_app_with(test_config())
}

pub fn test_app_with(config: Config) -> TestApp {
    let (dir, db) = test_db();
    let scraper = Arc::new(FakeScraper::new());
    let notifier = Arc::new(FakeNotifier::new(true));
    let ctx = AppContext::new(
        db,
        Arc::clone(&scraper) as Arc<dyn PriceSource>,
        Arc::clone(&notifier) as Arc<dyn DropNotifier>,
        config,
    );
    TestApp {
        _dir: dir,
        ctx,
        scraper,
        notifier,
    }
}
