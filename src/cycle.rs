//! The price-check cycle: scrape, compare, record, notify, one product at a
//! time, with failures contained to the product that caused them.

use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::context::{lock_product, AppContext, ProductLocks};
use crate::db::{CheckWrite, PriceStore};
use crate::domain::{DropPolicy, NewNotification, Product};
use crate::errors::AppError;
use crate::mailer::{DropAlert, DropNotifier};
use crate::scraper::{PriceSource, ScraperError};

/// The collaborators one cycle drives.
#[derive(Clone, Copy)]
pub struct CycleDeps<'a> {
    pub store: &'a dyn PriceStore,
    pub scraper: &'a dyn PriceSource,
    pub notifier: &'a dyn DropNotifier,
    pub locks: &'a ProductLocks,
}

impl<'a> CycleDeps<'a> {
    pub fn from_context(ctx: &'a AppContext) -> Self {
        Self {
            store: &ctx.db,
            scraper: ctx.scraper.as_ref(),
            notifier: ctx.notifier.as_ref(),
            locks: &ctx.locks,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CycleOptions {
    /// Per-product scrape budget.
    pub timeout: Duration,
    pub policy: DropPolicy,
    /// Pause between products; zero disables it.
    pub product_delay: Duration,
}

impl CycleOptions {
    pub fn from_context(ctx: &AppContext) -> Self {
        Self {
            timeout: ctx.config.request_timeout,
            policy: ctx.drop_policy(),
            product_delay: ctx.config.product_delay,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Scrape,
    Store,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductError {
    pub product_id: i64,
    pub product_name: String,
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleReport {
    /// Products whose new price was recorded.
    pub checked: usize,
    /// Checks that qualified as a drop.
    pub dropped: usize,
    /// Scrape failures, timeouts included.
    pub failed: usize,
    pub skipped: usize,
    pub notifications_failed: usize,
    pub errors: Vec<ProductError>,
    /// Stopped early on request.
    pub cancelled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationOutcome {
    pub event_id: i64,
    pub sent: bool,
    /// Set when the send result could not be stored on the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// Product inactive; nothing was scraped or written.
    Skipped,
    /// Nothing was written.
    ScrapeFailed { error: String },
    Checked {
        product_name: String,
        old_price: Option<Decimal>,
        new_price: Decimal,
        threshold_price: Decimal,
        dropped: bool,
        notification: Option<NotificationOutcome>,
    },
}

/// Steps 1-4 for one product. The product row is re-read under the
/// product's lock so a check that ran in between is seen as the baseline.
/// Store failures before the observation is committed come back as `Err`.
pub fn check_product(
    deps: CycleDeps<'_>,
    opts: &CycleOptions,
    product_id: i64,
) -> Result<CheckOutcome, AppError> {
    let lock = deps.locks.handle(product_id);
    let _guard = lock_product(&lock);

    let product = deps
        .store
        .get_product(product_id)?
        .ok_or_else(|| AppError::NotFound(format!("Product with ID {product_id} not found")))?;

    if !product.is_active {
        tracing::debug!(product_id, "skipping inactive product");
        return Ok(CheckOutcome::Skipped);
    }

    let scraped = match deps.scraper.fetch(&product.url, product.site, opts.timeout) {
        Ok(scraped) => scraped,
        Err(e) => {
            if e == ScraperError::Timeout {
                tracing::warn!(product_id, url = %product.url, "scrape timed out");
            } else {
                tracing::warn!(product_id, url = %product.url, error = %e, "scrape failed");
            }
            return Ok(CheckOutcome::ScrapeFailed {
                error: e.to_string(),
            });
        }
    };

    let old_price = product.current_price;
    let new_price = scraped.price;
    let dropped = opts
        .policy
        .is_drop(old_price, new_price, product.threshold_price);

    let notification = match (dropped, old_price) {
        (true, Some(old)) => Some(NewNotification {
            old_price: old,
            new_price,
            threshold_price: product.threshold_price,
        }),
        _ => None,
    };

    let event_id = deps.store.record_check(&CheckWrite {
        product_id,
        price: new_price,
        at: Utc::now(),
        notification: notification.clone(),
    })?;

    tracing::info!(
        product_id,
        old = ?old_price,
        new = %new_price,
        threshold = %product.threshold_price,
        strategy = scraped.strategy,
        dropped,
        "price recorded"
    );

    let notification = match (event_id, notification) {
        (Some(event_id), Some(n)) => Some(notify(deps, &product, event_id, &n)),
        _ => None,
    };

    Ok(CheckOutcome::Checked {
        product_name: product.name,
        old_price,
        new_price,
        threshold_price: product.threshold_price,
        dropped,
        notification,
    })
}

fn notify(
    deps: CycleDeps<'_>,
    product: &Product,
    event_id: i64,
    n: &NewNotification,
) -> NotificationOutcome {
    tracing::info!(product_id = product.id, event_id, "price drop detected, notifying");

    let sent = deps.notifier.send_drop_alert(&DropAlert {
        product_name: &product.name,
        url: &product.url,
        old_price: n.old_price,
        new_price: n.new_price,
        threshold_price: n.threshold_price,
    });

    if !sent {
        tracing::error!(product_id = product.id, event_id, "notification not delivered; event left unsent");
    }

    // The observation is already committed; a failed update leaves the
    // event unsent, so a later resend may duplicate the email.
    let record_error = deps
        .store
        .mark_notification_sent(event_id, sent)
        .err()
        .map(|e| {
            tracing::error!(product_id = product.id, event_id, error = %e, "could not record send result");
            e.to_string()
        });

    NotificationOutcome {
        event_id,
        sent,
        record_error,
    }
}

/// One pass over `products`. Never fails as a whole: every per-product
/// problem lands in the report and the loop moves on. `cancel` is polled
/// between products, so the product in flight always completes.
pub fn run_cycle(
    deps: CycleDeps<'_>,
    opts: &CycleOptions,
    products: &[Product],
    cancel: &AtomicBool,
) -> CycleReport {
    let mut report = CycleReport::default();

    for (i, product) in products.iter().enumerate() {
        if cancel.load(Ordering::SeqCst) {
            tracing::info!(remaining = products.len() - i, "cycle cancelled");
            report.cancelled = true;
            break;
        }

        if i > 0 {
            polite_pause(opts.product_delay);
        }

        if !product.is_active {
            report.skipped += 1;
            continue;
        }

        match check_product(deps, opts, product.id) {
            Ok(CheckOutcome::Skipped) => report.skipped += 1,
            Ok(CheckOutcome::ScrapeFailed { error }) => {
                report.failed += 1;
                report.errors.push(ProductError {
                    product_id: product.id,
                    product_name: product.name.clone(),
                    kind: FailureKind::Scrape,
                    message: error,
                });
            }
            Ok(CheckOutcome::Checked {
                dropped,
                notification,
                ..
            }) => {
                report.checked += 1;
                if dropped {
                    report.dropped += 1;
                }
                if let Some(n) = notification {
                    if !n.sent {
                        report.notifications_failed += 1;
                    }
                    if let Some(message) = n.record_error {
                        report.errors.push(ProductError {
                            product_id: product.id,
                            product_name: product.name.clone(),
                            kind: FailureKind::Store,
                            message,
                        });
                    }
                }
            }
            Err(e) => {
                tracing::error!(product_id = product.id, error = %e, "store failure, continuing with next product");
                report.errors.push(ProductError {
                    product_id: product.id,
                    product_name: product.name.clone(),
                    kind: FailureKind::Store,
                    message: e.to_string(),
                });
            }
        }
    }

    report
}

/// Loads the active set and runs one cycle over it. Failing to read the set
/// is the one error that aborts the invocation.
pub fn run_active_cycle(
    deps: CycleDeps<'_>,
    opts: &CycleOptions,
    cancel: &AtomicBool,
) -> Result<CycleReport, AppError> {
    let products = deps.store.get_active_products().map_err(|e| {
        tracing::error!(error = %e, "cannot load active products, cycle aborted");
        e
    })?;

    tracing::info!(count = products.len(), "price check cycle started");
    let report = run_cycle(deps, opts, &products, cancel);
    tracing::info!(
        checked = report.checked,
        dropped = report.dropped,
        failed = report.failed,
        errors = report.errors.len(),
        "price check cycle finished"
    );

    Ok(report)
}

fn polite_pause(base: Duration) {
    if base.is_zero() {
        return;
    }
    let jitter_ms = rand::thread_rng().gen_range(0..=base.as_millis() as u64 / 4);
    std::thread::sleep(base + Duration::from_millis(jitter_ms));
}
