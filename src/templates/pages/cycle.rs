use crate::cycle::CycleReport;
use crate::templates::components::stat;
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub fn cycle_result_page(report: &CycleReport) -> Markup {
    desktop_layout(
        "Price check",
        html! {
            main class="container" {
                h1 { "Price check finished" }
                div class="stats" {
                    (stat("Checked", report.checked))
                    (stat("Drops", report.dropped))
                    (stat("Failed", report.failed))
                    (stat("Skipped", report.skipped))
                    (stat("Emails failed", report.notifications_failed))
                }
                @if !report.errors.is_empty() {
                    section class="card" {
                        h2 { "Problems" }
                        ul {
                            @for e in &report.errors {
                                li {
                                    a href=(format!("/products/{}", e.product_id)) { (e.product_name) }
                                    ": " (e.message)
                                }
                            }
                        }
                    }
                }
                p { a href="/" { "Back to dashboard" } }
            }
        },
    )
}
