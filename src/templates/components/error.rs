use crate::templates::desktop_layout;
use maud::{html, Markup};

/// Basic error page; `message` is already safe to show.
pub fn error_page(status: u16, message: &str) -> Markup {
    desktop_layout(
        &format!("Error {status}"),
        html! {
            main class="container" {
                section class="card" {
                    h1 { "Error " (status) }
                    p { (message) }
                    p { a href="/" { "← Back to dashboard" } }
                }
            }
        },
    )
}
