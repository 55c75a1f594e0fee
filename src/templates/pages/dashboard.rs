use crate::db::Statistics;
use crate::domain::Product;
use crate::templates::components::{opt_money, post_button, stat};
use crate::templates::{desktop_layout, money};
use maud::{html, Markup};

pub struct DashboardVm {
    pub stats: Statistics,
    pub products: Vec<Product>,
    pub currency: String,
    /// One-off message shown above the table, e.g. after adding a product.
    pub notice: Option<String>,
}

pub fn dashboard_page(vm: &DashboardVm) -> Markup {
    desktop_layout(
        "Dashboard",
        html! {
            main class="container" {
                h1 { "Dashboard" }

                @if let Some(notice) = &vm.notice {
                    section class="card" { p { (notice) } }
                }

                div class="stats" {
                    (stat("Active products", vm.stats.active_products))
                    (stat("Products with drops", vm.stats.products_with_drops))
                    (stat("Alerts sent", vm.stats.notifications_sent))
                    (stat("Pending alerts", vm.stats.pending_notifications))
                    (stat("Avg drop %", format!("{:.2}", vm.stats.avg_drop_percent)))
                    (stat("Observations", vm.stats.observations))
                }

                (add_product_card())

                section class="card" {
                    h2 { "Tracked products" }
                    p { (post_button("/check-all", "Run price check now")) }

                    @if vm.products.is_empty() {
                        p class="muted" { "No products yet. Add one above." }
                    } @else {
                        table {
                            thead {
                                tr {
                                    th { "Product" }
                                    th { "Site" }
                                    th { "Current" }
                                    th { "Threshold" }
                                    th { "Last checked" }
                                    th {}
                                }
                            }
                            tbody {
                                @for p in &vm.products {
                                    tr {
                                        td { a href=(format!("/products/{}", p.id)) { (p.name) } }
                                        td { (p.site.as_str()) }
                                        td class=[p.is_below_threshold().then_some("below")] {
                                            (opt_money(&vm.currency, p.current_price))
                                        }
                                        td { (money(&vm.currency, p.threshold_price)) }
                                        td class="muted" {
                                            @match p.last_checked {
                                                Some(t) => (t.format("%Y-%m-%d %H:%M").to_string()),
                                                None => "never",
                                            }
                                        }
                                        td {
                                            (post_button(&format!("/products/{}/check", p.id), "Check"))
                                            " "
                                            (post_button(&format!("/products/{}/deactivate", p.id), "Stop tracking"))
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

fn add_product_card() -> Markup {
    html! {
        section class="card" id="add-product" {
            h2 { "Add product" }
            form method="post" action="/products" style="display: flex; gap: 10px; flex-wrap: wrap;" {
                input type="url" name="url" placeholder="https://www.amazon.in/dp/..." required size="50";
                input type="number" name="threshold_price" placeholder="Alert below" step="0.01" min="0.01" required;
                input type="text" name="name" placeholder="Name (optional)";
                button type="submit" { "Add" }
            }
        }
    }
}
