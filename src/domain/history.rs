// src/domain/history.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// One row of the append-only `price_history` log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceObservation {
    pub id: i64,
    pub product_id: i64,
    pub price: Decimal,
    pub observed_at: DateTime<Utc>,
}

/// One row of the append-only `notifications` log. `email_sent` is the only
/// column ever updated: false when the drop is recorded, true once a send
/// succeeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationEvent {
    pub id: i64,
    pub product_id: i64,
    pub old_price: Decimal,
    pub new_price: Decimal,
    pub threshold_price: Decimal,
    pub sent_at: DateTime<Utc>,
    pub email_sent: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub old_price: Decimal,
    pub new_price: Decimal,
    pub threshold_price: Decimal,
}

/// An event joined with the product fields the email needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingNotification {
    pub event: NotificationEvent,
    pub product_name: String,
    pub url: String,
}
