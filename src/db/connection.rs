use rusqlite::Connection;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::AppError;

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

// Thread-local connection slot, tagged with the file it was opened on.
thread_local! {
    static DB_CONN: RefCell<Option<(PathBuf, Connection)>> = const { RefCell::new(None) };
}

/// Handle to the SQLite file. Cloning copies the path only; each thread
/// lazily opens its own connection.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Provides a mutable connection to the closure.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Connection) -> Result<T, AppError>,
    {
        DB_CONN
            .try_with(|cell| {
                let mut slot = cell.borrow_mut();

                let stale = !matches!(&*slot, Some((p, _)) if p == &self.path);
                if stale {
                    *slot = Some((self.path.clone(), open_connection(&self.path)?));
                }

                match slot.as_mut() {
                    Some((_, conn)) => f(conn),
                    None => Err(AppError::Internal("connection slot empty".into())),
                }
            })
            .map_err(|_| AppError::Internal("thread-local connection unavailable".into()))?
    }

    /// Round-trip used by the diagnostics page.
    pub fn ping(&self) -> Result<(), AppError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0))
                .map_err(|e| AppError::Db(format!("ping failed: {e}")))?;
            Ok(())
        })
    }
}

fn open_connection(path: &Path) -> Result<Connection, AppError> {
    let conn = Connection::open(path)
        .map_err(|e| AppError::Db(format!("Open DB failed: {e}")))?;

    // Dashboard workers and the scheduler thread share the file.
    conn.busy_timeout(Duration::from_secs(10))
        .map_err(|e| AppError::Db(format!("busy_timeout failed: {e}")))?;
    conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL;")
        .map_err(|e| AppError::Db(format!("pragma failed: {e}")))?;

    Ok(conn)
}

/// Apply the embedded schema. Safe to call on every start.
pub fn init_db(db: &Database) -> Result<(), AppError> {
    db.with_conn(|conn| {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| AppError::Db(format!("Failed to apply schema: {e}")))?;
        Ok(())
    })?;

    tracing::info!(path = %db.path().display(), "database initialized");
    Ok(())
}
