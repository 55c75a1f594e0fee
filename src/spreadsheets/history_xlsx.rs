use crate::domain::{PriceObservation, Product};
use crate::errors::AppError;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook};

pub fn export_history_xlsx(
    product: &Product,
    history: &[PriceObservation],
) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();
    let money = Format::new().set_num_format("#,##0.00");

    worksheet
        .set_name("Price History")
        .map_err(|e| AppError::Export(format!("Failed to name sheet: {e}")))?;

    worksheet
        .write_string_with_format(0, 0, &product.name, &bold)
        .map_err(|e| AppError::Export(format!("Failed to write title: {e}")))?;
    worksheet
        .write_string(1, 0, &product.url)
        .map_err(|e| AppError::Export(format!("Failed to write url: {e}")))?;

    // Headers
    for (col, header) in ["Date", "Price"].iter().enumerate() {
        worksheet
            .write_string_with_format(3, col as u16, *header, &bold)
            .map_err(|e| {
                AppError::Export(format!("Failed to write header '{}': {}", header, e))
            })?;
    }

    // Rows
    for (i, obs) in history.iter().enumerate() {
        let r = (i + 4) as u32;

        worksheet
            .write_string(r, 0, obs.observed_at.format("%Y-%m-%d %H:%M:%S").to_string())
            .map_err(|e| AppError::Export(format!("Failed to write date: {}", e)))?;

        let price = obs.price.to_f64().unwrap_or_default();
        worksheet
            .write_number_with_format(r, 1, price, &money)
            .map_err(|e| AppError::Export(format!("Failed to write price: {}", e)))?;
    }

    worksheet
        .set_column_width(0, 22)
        .map_err(|e| AppError::Export(format!("Failed to size column: {e}")))?;

    workbook
        .save_to_buffer()
        .map_err(|e| AppError::Export(format!("Failed to save workbook: {}", e)))
}
