pub mod history_csv;
pub mod history_xlsx;

pub use history_csv::export_history_csv;
pub use history_xlsx::export_history_xlsx;

use serde::Serialize;
use std::str::FromStr;

use crate::domain::{PriceObservation, Product};
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "xlsx" => Ok(ExportFormat::Xlsx),
            other => Err(AppError::BadRequest(format!(
                "unknown export format '{other}' (expected csv, json or xlsx)"
            ))),
        }
    }
}

#[derive(Debug)]
pub struct ExportFile {
    pub filename: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

#[derive(Serialize)]
struct JsonPoint<'a> {
    timestamp: String,
    price: &'a rust_decimal::Decimal,
}

pub fn render_history(
    product: &Product,
    history: &[PriceObservation],
    format: ExportFormat,
) -> Result<ExportFile, AppError> {
    let bytes = match format {
        ExportFormat::Csv => export_history_csv(history).into_bytes(),
        ExportFormat::Json => {
            let points: Vec<JsonPoint<'_>> = history
                .iter()
                .map(|o| JsonPoint {
                    timestamp: o.observed_at.to_rfc3339(),
                    price: &o.price,
                })
                .collect();
            serde_json::to_vec_pretty(&points)
                .map_err(|e| AppError::Export(format!("json encode failed: {e}")))?
        }
        ExportFormat::Xlsx => export_history_xlsx(product, history)?,
    };

    Ok(ExportFile {
        filename: format!("price_history_{}.{}", product.id, format.extension()),
        format,
        bytes,
    })
}
