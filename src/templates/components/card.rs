use maud::{html, Markup};

pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        section class="card" {
            h2 { (title) }
            div class="card-body" {
                (body)
            }
        }
    }
}

pub fn stat(label: &str, value: impl std::fmt::Display) -> Markup {
    html! {
        div class="stat" {
            strong { (value.to_string()) }
            span class="muted" { (label) }
        }
    }
}
