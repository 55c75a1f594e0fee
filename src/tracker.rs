//! Operations behind the CLI and the dashboard. Everything here goes
//! through `AppContext`, so both surfaces behave the same way.

use chrono::{Duration as ChronoDuration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::atomic::AtomicBool;

use crate::context::{lock_product, AppContext};
use crate::cycle::{self, CheckOutcome, CycleDeps, CycleOptions, CycleReport};
use crate::db::{self, CheckWrite, PriceStore, Statistics};
use crate::domain::{
    NewProduct, NotificationEvent, PendingNotification, PriceObservation, Product, SiteKind,
};
use crate::errors::AppError;
use crate::mailer::{DropAlert, EmailSelfTest};
use crate::scraper::ScrapeDiagnosis;
use crate::spreadsheets::{render_history, ExportFile, ExportFormat};

/// More pending events than this go out as a single summary email.
pub const SUMMARY_BATCH: usize = 5;

pub const DEFAULT_EXPORT_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct AddProduct {
    pub url: String,
    pub threshold_price: Decimal,
    pub name: Option<String>,
    pub check_interval_secs: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddedProduct {
    pub product: Product,
    pub initial_price: Decimal,
    /// The URL was already tracked; its row was updated and reactivated.
    pub existed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessReport {
    pub processed: usize,
    pub emails_sent: usize,
    pub failed: usize,
}

/// Validates the URL and threshold, scrapes once, then stores the product
/// with its first observation. Nothing is notified for the initial price.
pub fn add_product(ctx: &AppContext, req: AddProduct) -> Result<AddedProduct, AppError> {
    let url = req.url.trim().to_string();
    if url.is_empty() {
        return Err(AppError::BadRequest("URL is required".into()));
    }
    let site = SiteKind::classify(&url).map_err(|e| AppError::BadRequest(e.to_string()))?;

    if req.threshold_price <= Decimal::ZERO {
        return Err(AppError::BadRequest(
            "Threshold price must be greater than 0".into(),
        ));
    }
    let check_interval_secs = req
        .check_interval_secs
        .unwrap_or(ctx.config.default_check_interval_secs);
    if check_interval_secs <= 0 {
        return Err(AppError::BadRequest(
            "Check interval must be greater than 0".into(),
        ));
    }

    let scraped = ctx
        .scraper
        .fetch(&url, site, ctx.config.request_timeout)
        .map_err(|e| {
            AppError::BadRequest(format!("Could not scrape product information from URL: {e}"))
        })?;

    let name = req
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| scraped.name.clone());

    let existed = ctx
        .db
        .with_conn(|conn| db::products::get_product_by_url(conn, &url))?
        .is_some();

    let now = Utc::now();
    let product_id = ctx.db.with_conn(|conn| {
        db::products::upsert_product(
            conn,
            &NewProduct {
                name,
                url: url.clone(),
                threshold_price: req.threshold_price,
                site,
                check_interval_secs,
            },
            now,
        )
    })?;

    {
        let lock = ctx.locks.handle(product_id);
        let _guard = lock_product(&lock);
        ctx.db.record_check(&CheckWrite {
            product_id,
            price: scraped.price,
            at: now,
            notification: None,
        })?;
    }

    let product = ctx
        .db
        .get_product(product_id)?
        .ok_or_else(|| AppError::Internal(format!("product {product_id} vanished after insert")))?;

    tracing::info!(
        product_id,
        url = %product.url,
        price = %scraped.price,
        threshold = %product.threshold_price,
        existed,
        "product added"
    );

    Ok(AddedProduct {
        product,
        initial_price: scraped.price,
        existed,
    })
}

pub fn deactivate_product(ctx: &AppContext, product_id: i64) -> Result<(), AppError> {
    if !get_product(ctx, product_id)?.is_active {
        return Err(AppError::Conflict(format!(
            "Product with ID {product_id} is already inactive"
        )));
    }
    ctx.db
        .with_conn(|conn| db::products::deactivate_product(conn, product_id))?;
    tracing::info!(product_id, "product deactivated");
    Ok(())
}

pub fn list_products(ctx: &AppContext, include_inactive: bool) -> Result<Vec<Product>, AppError> {
    if include_inactive {
        ctx.db.with_conn(|conn| db::products::get_all_products(conn))
    } else {
        ctx.db.get_active_products()
    }
}

pub fn get_product(ctx: &AppContext, product_id: i64) -> Result<Product, AppError> {
    ctx.db
        .get_product(product_id)?
        .ok_or_else(|| AppError::NotFound(format!("Product with ID {product_id} not found")))
}

/// Manual check of one product, outside any cycle.
pub fn check_product(ctx: &AppContext, product_id: i64) -> Result<CheckOutcome, AppError> {
    cycle::check_product(
        CycleDeps::from_context(ctx),
        &CycleOptions::from_context(ctx),
        product_id,
    )
}

/// One on-demand cycle over every active product.
pub fn check_all(ctx: &AppContext) -> Result<CycleReport, AppError> {
    let cancel = AtomicBool::new(false);
    cycle::run_active_cycle(
        CycleDeps::from_context(ctx),
        &CycleOptions::from_context(ctx),
        &cancel,
    )
}

pub fn statistics(ctx: &AppContext) -> Result<Statistics, AppError> {
    ctx.db.with_conn(|conn| db::stats::get_statistics(conn))
}

/// Observations from the last `days` days, oldest first.
pub fn price_history(
    ctx: &AppContext,
    product_id: i64,
    days: i64,
) -> Result<Vec<PriceObservation>, AppError> {
    get_product(ctx, product_id)?;
    let since = Utc::now() - ChronoDuration::days(days.max(0));
    ctx.db
        .with_conn(|conn| db::price_history::get_price_history(conn, product_id, since))
}

pub fn observation_count(ctx: &AppContext, product_id: i64) -> Result<i64, AppError> {
    ctx.db
        .with_conn(|conn| db::price_history::count_observations(conn, product_id))
}

pub fn product_notifications(
    ctx: &AppContext,
    product_id: i64,
) -> Result<Vec<NotificationEvent>, AppError> {
    ctx.db.with_conn(|conn| {
        db::notifications::get_notifications_for_product(conn, product_id)
    })
}

pub fn recent_notifications(
    ctx: &AppContext,
    limit: i64,
) -> Result<Vec<PendingNotification>, AppError> {
    ctx.db
        .with_conn(|conn| db::notifications::get_recent_notifications(conn, limit))
}

pub fn export_history(
    ctx: &AppContext,
    product_id: i64,
    days: i64,
    format: ExportFormat,
) -> Result<ExportFile, AppError> {
    if days <= 0 {
        return Err(AppError::BadRequest("days must be greater than 0".into()));
    }
    let product = get_product(ctx, product_id)?;
    let history = price_history(ctx, product_id, days)?;
    tracing::info!(product_id, rows = history.len(), format = format.extension(), "exporting history");
    render_history(&product, &history, format)
}

pub fn test_scraping(ctx: &AppContext, url: &str) -> ScrapeDiagnosis {
    ctx.scraper.diagnose(url.trim(), ctx.config.request_timeout)
}

pub fn test_email(ctx: &AppContext) -> EmailSelfTest {
    ctx.notifier.self_test()
}

/// Resends events whose email never went out. Up to `SUMMARY_BATCH` are sent
/// one by one; more than that go as one summary. An event is marked sent
/// only when its message was accepted.
pub fn process_pending_notifications(ctx: &AppContext) -> Result<ProcessReport, AppError> {
    let pending = ctx
        .db
        .with_conn(|conn| db::notifications::get_pending_notifications(conn))?;

    let mut report = ProcessReport {
        processed: pending.len(),
        ..ProcessReport::default()
    };
    if pending.is_empty() {
        return Ok(report);
    }

    let alerts: Vec<DropAlert<'_>> = pending.iter().map(alert_for).collect();

    if pending.len() > SUMMARY_BATCH {
        if ctx.notifier.send_summary(&alerts) {
            for p in &pending {
                ctx.db.mark_notification_sent(p.event.id, true)?;
            }
            report.emails_sent = 1;
        } else {
            report.failed = pending.len();
        }
    } else {
        for (p, alert) in pending.iter().zip(&alerts) {
            if ctx.notifier.send_drop_alert(alert) {
                ctx.db.mark_notification_sent(p.event.id, true)?;
                report.emails_sent += 1;
            } else {
                report.failed += 1;
            }
        }
    }

    tracing::info!(
        processed = report.processed,
        sent = report.emails_sent,
        failed = report.failed,
        "pending notifications processed"
    );
    Ok(report)
}

fn alert_for(p: &PendingNotification) -> DropAlert<'_> {
    DropAlert {
        product_name: &p.product_name,
        url: &p.url,
        old_price: p.event.old_price,
        new_price: p.event.new_price,
        threshold_price: p.event.threshold_price,
    }
}
