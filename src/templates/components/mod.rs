use maud::{html, Markup};
use rust_decimal::Decimal;

pub use crate::mailer::templates::money;

pub mod card;
pub mod chart;
pub mod error;

pub use card::{card, stat};
pub use chart::price_chart;
pub use error::error_page;

pub fn button(label: &str) -> Markup {
    html! {
        button type="submit" { (label) }
    }
}

/// A form with a single POST button, e.g. "Check now".
pub fn post_button(action: &str, label: &str) -> Markup {
    html! {
        form class="inline" method="post" action=(action) {
            (button(label))
        }
    }
}

pub fn opt_money(currency: &str, amount: Option<Decimal>) -> String {
    match amount {
        Some(a) => money(currency, a),
        None => "N/A".to_string(),
    }
}
