use maud::{html, Markup, DOCTYPE, PreEscaped};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f6f7fb; color: #222; }
header { display: flex; align-items: center; justify-content: space-between; padding: 0.75rem 1.5rem; background: white; box-shadow: 0 1px 3px rgba(0,0,0,.08); }
header nav ul { display: flex; gap: 1rem; list-style: none; margin: 0; padding: 0; }
main.container { max-width: 1100px; margin: 1.5rem auto; padding: 0 1rem; }
.card { background: white; border-radius: 8px; padding: 1rem 1.25rem; margin-bottom: 1rem; box-shadow: 0 1px 2px rgba(0,0,0,.06); }
.stats { display: grid; grid-template-columns: repeat(auto-fit, minmax(150px, 1fr)); gap: 0.75rem; }
.stat { background: white; border-radius: 8px; padding: 0.75rem; text-align: center; }
.stat strong { display: block; font-size: 1.5rem; }
table { width: 100%; border-collapse: collapse; }
th, td { text-align: left; padding: 0.4rem 0.5rem; border-bottom: 1px solid #eee; }
.below { color: #16a34a; font-weight: bold; }
.muted { color: #6b7280; }
.ok { color: #16a34a; }
.fail { color: #dc2626; }
form.inline { display: inline; }
button { cursor: pointer; padding: 4px 12px; border-radius: 4px; border: 1px solid #524ed2; background: #524ed2; color: white; }
"#;

pub fn desktop_layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Price Tracker" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                header {
                    svg
                        xmlns="http://www.w3.org/2000/svg"
                        width="24"
                        height="24"
                        viewBox="0 0 24 24"
                        fill="none"
                        stroke="#524ed2"
                        stroke-width="2"
                        stroke-linecap="round"
                        stroke-linejoin="round"
                    {
                        path stroke="none" d="M0 0h24v24H0z" fill="none" {}
                        path d="M3 17l6 -6l4 4l8 -8" {}
                        path d="M14 7l7 0l0 7" {}
                    }
                    h3 { "Price Tracker" }
                    nav {
                        ul {
                            li { a href="/" { "Dashboard" } }
                            li { a href="/diagnostics" { "Diagnostics" } }
                        }
                    }
                }
                (content)
            }
        }
    }
}
