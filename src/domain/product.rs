// src/domain/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::SiteKind;

/// A tracked product as stored in the `products` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub url: String,
    /// Absent until the first successful check.
    pub current_price: Option<Decimal>,
    pub threshold_price: Decimal,
    pub site: SiteKind,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_checked: Option<DateTime<Utc>>,
    pub check_interval_secs: i64,
}

impl Product {
    pub fn is_below_threshold(&self) -> bool {
        self.current_price
            .map(|p| p <= self.threshold_price)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub url: String,
    pub threshold_price: Decimal,
    pub site: SiteKind,
    pub check_interval_secs: i64,
}
