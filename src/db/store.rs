// src/db/store.rs
//! The narrow Store interface the price-check cycle drives.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::db::connection::Database;
use crate::db::{notifications, price_history, products};
use crate::domain::{NewNotification, Product};
use crate::errors::AppError;

/// Everything one successful check writes.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckWrite {
    pub product_id: i64,
    pub price: Decimal,
    pub at: DateTime<Utc>,
    /// Present when the check qualified as a drop.
    pub notification: Option<NewNotification>,
}

pub trait PriceStore {
    fn get_active_products(&self) -> Result<Vec<Product>, AppError>;

    fn get_product(&self, product_id: i64) -> Result<Option<Product>, AppError>;

    /// Appends the observation, moves the current price and, if requested,
    /// records the unsent notification event, all in one transaction.
    /// Returns the event id when one was created.
    fn record_check(&self, write: &CheckWrite) -> Result<Option<i64>, AppError>;

    fn mark_notification_sent(&self, event_id: i64, success: bool) -> Result<(), AppError>;
}

impl PriceStore for Database {
    fn get_active_products(&self) -> Result<Vec<Product>, AppError> {
        self.with_conn(|conn| products::get_active_products(conn))
    }

    fn get_product(&self, product_id: i64) -> Result<Option<Product>, AppError> {
        self.with_conn(|conn| products::get_product(conn, product_id))
    }

    fn record_check(&self, write: &CheckWrite) -> Result<Option<i64>, AppError> {
        self.with_conn(|conn| {
            let tx = conn
                .transaction()
                .map_err(|e| AppError::Db(format!("begin failed: {e}")))?;

            price_history::record_observation(&tx, write.product_id, write.price, write.at)?;
            products::update_current_price(&tx, write.product_id, write.price, write.at)?;

            let event_id = match &write.notification {
                Some(n) => Some(notifications::create_notification_event(
                    &tx,
                    write.product_id,
                    n,
                    write.at,
                )?),
                None => None,
            };

            tx.commit()
                .map_err(|e| AppError::Db(format!("commit failed: {e}")))?;
            Ok(event_id)
        })
    }

    fn mark_notification_sent(&self, event_id: i64, success: bool) -> Result<(), AppError> {
        self.with_conn(|conn| notifications::mark_notification_sent(conn, event_id, success))
    }
}
