// src/db/stats.rs
use rusqlite::Connection;
use serde::Serialize;

use crate::errors::AppError;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub active_products: i64,
    pub products_with_drops: i64,
    pub notifications_sent: i64,
    pub pending_notifications: i64,
    /// Mean percentage drop across sent notifications, two decimals.
    pub avg_drop_percent: f64,
    pub observations: i64,
}

pub fn get_statistics(conn: &Connection) -> Result<Statistics, AppError> {
    let count = |sql: &str| -> Result<i64, AppError> {
        conn.query_row(sql, [], |r| r.get(0))
            .map_err(|e| AppError::Db(format!("statistics query failed: {e}")))
    };

    let active_products = count("SELECT COUNT(*) FROM products WHERE is_active = 1")?;
    let products_with_drops =
        count("SELECT COUNT(DISTINCT product_id) FROM notifications WHERE email_sent = 1")?;
    let notifications_sent = count("SELECT COUNT(*) FROM notifications WHERE email_sent = 1")?;
    let pending_notifications = count("SELECT COUNT(*) FROM notifications WHERE email_sent = 0")?;
    let observations = count("SELECT COUNT(*) FROM price_history")?;

    // Reporting only, so REAL arithmetic is fine here.
    let avg: Option<f64> = conn
        .query_row(
            r#"
            SELECT AVG((CAST(old_price AS REAL) - CAST(new_price AS REAL)) / CAST(old_price AS REAL) * 100.0)
            FROM notifications
            WHERE email_sent = 1 AND CAST(old_price AS REAL) > 0
            "#,
            [],
            |r| r.get(0),
        )
        .map_err(|e| AppError::Db(format!("statistics query failed: {e}")))?;

    Ok(Statistics {
        active_products,
        products_with_drops,
        notifications_sent,
        pending_notifications,
        avg_drop_percent: (avg.unwrap_or(0.0) * 100.0).round() / 100.0,
        observations,
    })
}
