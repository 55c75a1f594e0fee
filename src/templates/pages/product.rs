use crate::domain::{NotificationEvent, PriceObservation, Product};
use crate::templates::components::{opt_money, post_button, price_chart};
use crate::templates::{card, desktop_layout, money};
use maud::{html, Markup};

pub struct ProductVm {
    pub product: Product,
    pub history: Vec<PriceObservation>,
    pub notifications: Vec<NotificationEvent>,
    /// All observations ever recorded, not just the window.
    pub total_observations: i64,
    pub days: i64,
    pub currency: String,
}

pub fn product_page(vm: &ProductVm) -> Markup {
    let p = &vm.product;
    let c = vm.currency.as_str();

    desktop_layout(
        &p.name,
        html! {
            main class="container" {
                h1 { (p.name) }
                p { a href=(p.url) target="_blank" rel="noopener" { (p.url) } }

                (card("Details", html! {
                    table {
                        tr { th { "Site" } td { (p.site.as_str()) } }
                        tr { th { "Current price" } td { (opt_money(c, p.current_price)) } }
                        tr { th { "Threshold" } td { (money(c, p.threshold_price)) } }
                        tr { th { "Status" } td { @if p.is_active { "active" } @else { "inactive" } } }
                        tr { th { "Check interval" } td { (p.check_interval_secs) " s" } }
                        tr { th { "Checks recorded" } td { (vm.total_observations) } }
                        tr { th { "Added" } td { (p.created_at.format("%Y-%m-%d %H:%M").to_string()) } }
                    }
                    @if p.is_active {
                        p {
                            (post_button(&format!("/products/{}/check", p.id), "Check now"))
                            " "
                            (post_button(&format!("/products/{}/deactivate", p.id), "Stop tracking"))
                        }
                    }
                }))

                (card(&format!("Last {} days", vm.days), html! {
                    (price_chart(&vm.history, p.threshold_price))
                    p {
                        "Export: "
                        @for fmt in ["csv", "json", "xlsx"] {
                            a href=(format!("/products/{}/export?format={fmt}&days={}", p.id, vm.days)) { (fmt) }
                            " "
                        }
                    }
                }))

                (card("Price history", html! {
                    @if vm.history.is_empty() {
                        p class="muted" { "No observations in this window." }
                    } @else {
                        table {
                            thead { tr { th { "Observed" } th { "Price" } } }
                            tbody {
                                @for o in vm.history.iter().rev() {
                                    tr {
                                        td { (o.observed_at.format("%Y-%m-%d %H:%M:%S").to_string()) }
                                        td { (money(c, o.price)) }
                                    }
                                }
                            }
                        }
                    }
                }))

                (card("Drop alerts", html! {
                    @if vm.notifications.is_empty() {
                        p class="muted" { "No drops recorded." }
                    } @else {
                        table {
                            thead { tr { th { "When" } th { "Old" } th { "New" } th { "Email" } } }
                            tbody {
                                @for n in &vm.notifications {
                                    tr {
                                        td { (n.sent_at.format("%Y-%m-%d %H:%M").to_string()) }
                                        td { (money(c, n.old_price)) }
                                        td { (money(c, n.new_price)) }
                                        td {
                                            @if n.email_sent {
                                                span class="ok" { "sent" }
                                            } @else {
                                                span class="fail" { "pending" }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }))
            }
        },
    )
}
