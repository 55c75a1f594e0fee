// src/db/notifications.rs
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::db::columns;
use crate::domain::{NewNotification, NotificationEvent, PendingNotification};
use crate::errors::AppError;

fn map_event(row: &Row<'_>) -> rusqlite::Result<NotificationEvent> {
    Ok(NotificationEvent {
        id: row.get(0)?,
        product_id: row.get(1)?,
        old_price: columns::decimal(row, 2)?,
        new_price: columns::decimal(row, 3)?,
        threshold_price: columns::decimal(row, 4)?,
        sent_at: row.get(5)?,
        email_sent: row.get(6)?,
    })
}

/// Records the intent to notify. The row starts unsent.
pub fn create_notification_event(
    conn: &Connection,
    product_id: i64,
    n: &NewNotification,
    at: DateTime<Utc>,
) -> Result<i64, AppError> {
    conn.execute(
        r#"
        INSERT INTO notifications (product_id, old_price, new_price, threshold_price, sent_at, email_sent)
        VALUES (?, ?, ?, ?, ?, 0)
        "#,
        params![
            product_id,
            n.old_price.to_string(),
            n.new_price.to_string(),
            n.threshold_price.to_string(),
            at
        ],
    )
    .map_err(|e| AppError::Db(format!("create notification failed: {e}")))?;
    Ok(conn.last_insert_rowid())
}

/// Records the outcome of a send attempt.
pub fn mark_notification_sent(
    conn: &Connection,
    event_id: i64,
    success: bool,
) -> Result<(), AppError> {
    let changed = conn
        .execute(
            "UPDATE notifications SET email_sent = ? WHERE id = ?",
            params![success, event_id],
        )
        .map_err(|e| AppError::Db(format!("mark notification failed: {e}")))?;

    if changed == 0 {
        return Err(AppError::NotFound(format!("notification {event_id}")));
    }
    Ok(())
}

pub fn get_notifications_for_product(
    conn: &Connection,
    product_id: i64,
) -> Result<Vec<NotificationEvent>, AppError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, product_id, old_price, new_price, threshold_price, sent_at, email_sent
        FROM notifications
        WHERE product_id = ?
        ORDER BY sent_at DESC, id DESC
        "#,
    )?;
    let rows = stmt.query_map(params![product_id], map_event)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

const JOINED_COLUMNS: &str = r#"
    n.id, n.product_id, n.old_price, n.new_price, n.threshold_price, n.sent_at, n.email_sent,
    p.product_name, p.url
"#;

fn joined(conn: &Connection, sql: &str, limit: i64) -> Result<Vec<PendingNotification>, AppError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![limit], |row| {
        Ok(PendingNotification {
            event: map_event(row)?,
            product_name: row.get(7)?,
            url: row.get(8)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Events whose send has not succeeded yet, oldest first.
pub fn get_pending_notifications(conn: &Connection) -> Result<Vec<PendingNotification>, AppError> {
    joined(
        conn,
        &format!(
            "SELECT {JOINED_COLUMNS} FROM notifications n JOIN products p ON p.id = n.product_id \
             WHERE n.email_sent = 0 ORDER BY n.sent_at ASC, n.id ASC LIMIT ?"
        ),
        -1,
    )
}

/// Latest events of any status, newest first.
pub fn get_recent_notifications(
    conn: &Connection,
    limit: i64,
) -> Result<Vec<PendingNotification>, AppError> {
    joined(
        conn,
        &format!(
            "SELECT {JOINED_COLUMNS} FROM notifications n JOIN products p ON p.id = n.product_id \
             ORDER BY n.sent_at DESC, n.id DESC LIMIT ?"
        ),
        limit,
    )
}
