// responses/download.rs
use crate::errors::AppError;
use crate::responses::ResultResp;
use crate::spreadsheets::ExportFile;
use astra::{Body, ResponseBuilder};

/// Return an export as an attachment.
pub fn file_response(file: ExportFile) -> ResultResp {
    ResponseBuilder::new()
        .status(200)
        .header("Content-Type", file.format.content_type())
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", file.filename),
        )
        .body(Body::from(file.bytes))
        .map_err(|e| AppError::Internal(format!("build download response: {e}")))
}
