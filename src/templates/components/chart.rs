use crate::domain::PriceObservation;
use maud::{html, Markup};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 220.0;
const PAD: f64 = 24.0;

/// Inline SVG line chart of the observations with a dashed threshold line.
pub fn price_chart(history: &[PriceObservation], threshold: Decimal) -> Markup {
    if history.len() < 2 {
        return html! { p class="muted" { "Not enough data to draw a chart yet." } };
    }

    let prices: Vec<f64> = history
        .iter()
        .map(|o| o.price.to_f64().unwrap_or_default())
        .collect();
    let threshold = threshold.to_f64().unwrap_or_default();

    let lo = prices.iter().copied().fold(threshold, f64::min);
    let hi = prices.iter().copied().fold(threshold, f64::max);
    let span = if hi > lo { hi - lo } else { 1.0 };

    let y = |v: f64| PAD + (hi - v) / span * (HEIGHT - 2.0 * PAD);
    let step = (WIDTH - 2.0 * PAD) / (prices.len() - 1) as f64;

    let points = prices
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{:.1},{:.1}", PAD + i as f64 * step, y(*p)))
        .collect::<Vec<_>>()
        .join(" ");
    let ty = format!("{:.1}", y(threshold));

    html! {
        svg
            xmlns="http://www.w3.org/2000/svg"
            viewBox=(format!("0 0 {WIDTH} {HEIGHT}"))
            width="100%"
            role="img"
            aria-label="Price history chart"
        {
            line x1=(PAD) x2=(WIDTH - PAD) y1=(ty) y2=(ty)
                stroke="#dc2626" stroke-dasharray="6 4" stroke-width="1" {}
            polyline points=(points) fill="none" stroke="#524ed2" stroke-width="2" {}
        }
    }
}
