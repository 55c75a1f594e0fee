use crate::errors::AppError;
use crate::templates::components::error_page;
use astra::{Body, Response, ResponseBuilder};
use serde_json::json;

pub type ResultResp = Result<Response, AppError>;

/// Convert an AppError into an HTML error page
pub fn html_error_response(err: AppError) -> Response {
    log(&err);
    let status = err.status();
    let body = error_page(status, &err.public_message()).into_string();

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", mime::TEXT_HTML_UTF_8.as_ref())
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}

pub fn json_error_response(err: AppError) -> Response {
    log(&err);
    let status = err.status();
    let body = json!({ "success": false, "error": err.public_message() }).to_string();

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", mime::APPLICATION_JSON.as_ref())
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}

fn log(err: &AppError) {
    if err.status() >= 500 {
        tracing::error!(error = %err, "request failed");
    } else {
        tracing::debug!(error = %err, "request rejected");
    }
}
