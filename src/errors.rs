// errors.rs

/// Errors surfaced by the Store, the tracker service and the dashboard.
/// Scrape and mail failures have their own enums and never reach here raw.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database Error: {0}")]
    Db(String),

    #[error("Export Error: {0}")]
    Export(String),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> u16 {
        match self {
            AppError::NotFound(_) => 404,
            AppError::BadRequest(_) => 400,
            AppError::Conflict(_) => 409,
            AppError::Db(_) | AppError::Export(_) | AppError::Config(_) | AppError::Internal(_) => {
                500
            }
        }
    }

    /// Message safe to show in the dashboard or CLI. Server-side failures
    /// are replaced by a generic text; the detail only goes to the log.
    pub fn public_message(&self) -> String {
        match self {
            AppError::NotFound(msg) | AppError::BadRequest(msg) | AppError::Conflict(msg) => {
                msg.clone()
            }
            AppError::Db(_) => "A storage error occurred. Check the logs for details.".into(),
            AppError::Export(_) => "The export could not be generated.".into(),
            AppError::Config(msg) => format!("Configuration problem: {msg}"),
            AppError::Internal(_) => "Internal Server Error".into(),
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Db(e.to_string())
    }
}
