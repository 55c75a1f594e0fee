pub mod download;
pub mod errors;
pub mod html;
pub mod json;

pub use errors::{html_error_response, json_error_response, ResultResp};

pub use download::file_response;
pub use html::{html_response, redirect};
pub use json::{json_response, json_status};
