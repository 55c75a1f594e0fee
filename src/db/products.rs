// src/db/products.rs
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use crate::db::columns;
use crate::domain::{NewProduct, Product};
use crate::errors::AppError;

const PRODUCT_COLUMNS: &str = r#"
    id,                 -- 0
    product_name,       -- 1
    url,                -- 2
    current_price,      -- 3
    threshold_price,    -- 4
    site_type,          -- 5
    is_active,          -- 6
    created_at,         -- 7
    last_checked,       -- 8
    check_interval      -- 9
"#;

fn map_product(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        current_price: columns::opt_decimal(row, 3)?,
        threshold_price: columns::decimal(row, 4)?,
        site: columns::site(row, 5)?,
        is_active: row.get(6)?,
        created_at: row.get(7)?,
        last_checked: row.get(8)?,
        check_interval_secs: row.get(9)?,
    })
}

/// Insert a product, or reactivate the existing row for the same URL.
/// The id, current price and history of a re-added URL are kept.
pub fn upsert_product(
    conn: &Connection,
    product: &NewProduct,
    now: DateTime<Utc>,
) -> Result<i64, AppError> {
    conn.query_row(
        r#"
        INSERT INTO products (product_name, url, threshold_price, site_type, is_active, created_at, check_interval)
        VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6)
        ON CONFLICT(url) DO UPDATE SET
            product_name = excluded.product_name,
            threshold_price = excluded.threshold_price,
            site_type = excluded.site_type,
            check_interval = excluded.check_interval,
            is_active = 1
        RETURNING id
        "#,
        params![
            product.name,
            product.url,
            product.threshold_price.to_string(),
            product.site.as_str(),
            now,
            product.check_interval_secs
        ],
        |row| row.get(0),
    )
    .map_err(|e| AppError::Db(format!("insert product failed: {e}")))
}

pub fn get_product(conn: &Connection, product_id: i64) -> Result<Option<Product>, AppError> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?");
    conn.query_row(&sql, params![product_id], map_product)
        .optional()
        .map_err(|e| AppError::Db(format!("load product {product_id} failed: {e}")))
}

pub fn get_product_by_url(conn: &Connection, url: &str) -> Result<Option<Product>, AppError> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE url = ?");
    conn.query_row(&sql, params![url], map_product)
        .optional()
        .map_err(|e| AppError::Db(format!("load product by url failed: {e}")))
}

/// Active products, least recently checked first; never-checked rows lead.
pub fn get_active_products(conn: &Connection) -> Result<Vec<Product>, AppError> {
    list(
        conn,
        &format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 \
             ORDER BY last_checked IS NOT NULL, last_checked ASC, id ASC"
        ),
    )
}

pub fn get_all_products(conn: &Connection) -> Result<Vec<Product>, AppError> {
    list(
        conn,
        &format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY is_active DESC, id ASC"),
    )
}

fn list(conn: &Connection, sql: &str) -> Result<Vec<Product>, AppError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], map_product)?;

    let mut products = Vec::new();
    for r in rows {
        products.push(r?);
    }
    Ok(products)
}

pub fn update_current_price(
    conn: &Connection,
    product_id: i64,
    price: Decimal,
    at: DateTime<Utc>,
) -> Result<(), AppError> {
    let changed = conn
        .execute(
            "UPDATE products SET current_price = ?, last_checked = ? WHERE id = ?",
            params![price.to_string(), at, product_id],
        )
        .map_err(|e| AppError::Db(format!("update price failed: {e}")))?;

    if changed == 0 {
        return Err(AppError::NotFound(format!("product {product_id}")));
    }
    Ok(())
}

/// Clears the active flag. Rows are never hard-deleted.
pub fn deactivate_product(conn: &Connection, product_id: i64) -> Result<(), AppError> {
    let changed = conn
        .execute(
            "UPDATE products SET is_active = 0 WHERE id = ?",
            params![product_id],
        )
        .map_err(|e| AppError::Db(format!("deactivate failed: {e}")))?;

    if changed == 0 {
        return Err(AppError::NotFound(format!(
            "Product with ID {product_id} not found"
        )));
    }
    Ok(())
}
