use crate::mailer::EmailSelfTest;
use crate::scraper::ScrapeDiagnosis;
use crate::templates::{card, desktop_layout};
use maud::{html, Markup};

#[derive(Default)]
pub struct DiagnosticsVm {
    pub database_ok: bool,
    pub strategies: Vec<&'static str>,
    pub email_configured: bool,
    pub scrape: Option<ScrapeDiagnosis>,
    pub email: Option<EmailSelfTest>,
}

fn flag(ok: bool) -> Markup {
    html! {
        @if ok { span class="ok" { "yes" } } @else { span class="fail" { "no" } }
    }
}

pub fn diagnostics_page(vm: &DiagnosticsVm) -> Markup {
    desktop_layout(
        "Diagnostics",
        html! {
            main class="container" {
                h1 { "Diagnostics" }

                (card("Database", html! {
                    p { "Reachable: " (flag(vm.database_ok)) }
                }))

                (card("Scraping", html! {
                    p { "Strategies, in order: " (vm.strategies.join(", ")) }
                    form method="post" action="/diagnostics/scrape" style="display: flex; gap: 10px;" {
                        input type="url" name="url" placeholder="Product URL" required size="60";
                        button type="submit" { "Test scraping" }
                    }
                    @if let Some(d) = &vm.scrape {
                        h3 { (d.url) }
                        @if let Some(err) = &d.error {
                            p class="fail" { (err) }
                        }
                        table {
                            thead { tr { th { "Strategy" } th { "Name" } th { "Price" } th { "Error" } } }
                            tbody {
                                @for o in &d.outcomes {
                                    tr {
                                        td { (o.strategy) }
                                        td { @if let Some(p) = &o.product { (p.name) } }
                                        td { @if let Some(p) = &o.product { (p.price.to_string()) } }
                                        td class="fail" { @if let Some(e) = &o.error { (e) } }
                                    }
                                }
                            }
                        }
                        p {
                            "Recommended: "
                            strong { (d.recommended.unwrap_or("none")) }
                        }
                    }
                }))

                (card("Email", html! {
                    p { "Configured: " (flag(vm.email_configured)) }
                    form method="post" action="/diagnostics/email" {
                        button type="submit" { "Send test email" }
                    }
                    @if let Some(t) = &vm.email {
                        table {
                            tr { th { "Configuration valid" } td { (flag(t.config_valid)) } }
                            tr { th { "Connection" } td { (flag(t.connection_ok)) } }
                            tr { th { "Authentication" } td { (flag(t.auth_ok)) } }
                            tr { th { "Test email sent" } td { (flag(t.test_sent)) } }
                        }
                        @if let Some(err) = &t.error {
                            p class="fail" { (err) }
                        }
                    }
                }))
            }
        },
    )
}
