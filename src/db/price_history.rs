// src/db/price_history.rs
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

use crate::db::columns;
use crate::domain::PriceObservation;
use crate::errors::AppError;

/// Append one observation. History is a time series: unchanged prices are
/// still recorded.
pub fn record_observation(
    conn: &Connection,
    product_id: i64,
    price: Decimal,
    at: DateTime<Utc>,
) -> Result<i64, AppError> {
    conn.execute(
        "INSERT INTO price_history (product_id, price, observed_at) VALUES (?, ?, ?)",
        params![product_id, price.to_string(), at],
    )
    .map_err(|e| AppError::Db(format!("record observation failed: {e}")))?;
    Ok(conn.last_insert_rowid())
}

/// Observations at or after `since`, oldest first.
pub fn get_price_history(
    conn: &Connection,
    product_id: i64,
    since: DateTime<Utc>,
) -> Result<Vec<PriceObservation>, AppError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, product_id, price, observed_at
        FROM price_history
        WHERE product_id = ? AND observed_at >= ?
        ORDER BY observed_at ASC, id ASC
        "#,
    )?;

    let rows = stmt.query_map(params![product_id, since], |row| {
        Ok(PriceObservation {
            id: row.get(0)?,
            product_id: row.get(1)?,
            price: columns::decimal(row, 2)?,
            observed_at: row.get(3)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn count_observations(conn: &Connection, product_id: i64) -> Result<i64, AppError> {
    conn.query_row(
        "SELECT COUNT(*) FROM price_history WHERE product_id = ?",
        params![product_id],
        |r| r.get(0),
    )
    .map_err(|e| AppError::Db(format!("count observations failed: {e}")))
}
