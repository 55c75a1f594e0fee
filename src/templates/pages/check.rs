use crate::cycle::CheckOutcome;
use crate::domain::Product;
use crate::templates::components::opt_money;
use crate::templates::{desktop_layout, money};
use maud::{html, Markup};

pub fn check_result_page(product: &Product, outcome: &CheckOutcome, currency: &str) -> Markup {
    desktop_layout(
        "Check result",
        html! {
            main class="container" {
                section class="card" {
                    h1 { "Checked " (product.name) }
                    @match outcome {
                        CheckOutcome::Skipped => {
                            p class="muted" { "This product is inactive and was not checked." }
                        }
                        CheckOutcome::ScrapeFailed { error } => {
                            p class="fail" { "Could not read the price: " (error) }
                        }
                        CheckOutcome::Checked { old_price, new_price, threshold_price, dropped, notification, .. } => {
                            p { "Previous price: " (opt_money(currency, *old_price)) }
                            p { "Current price: " strong { (money(currency, *new_price)) } }
                            p { "Threshold: " (money(currency, *threshold_price)) }
                            @if *dropped {
                                p class="ok" { "Price drop detected." }
                                @if let Some(n) = notification {
                                    @if n.sent {
                                        p { "Alert email sent." }
                                    } @else {
                                        p class="fail" { "Alert email could not be sent; it stays pending." }
                                    }
                                }
                            }
                        }
                    }
                    p { a href=(format!("/products/{}", product.id)) { "Back to product" } }
                }
            }
        },
    )
}
