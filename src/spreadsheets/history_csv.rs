use crate::domain::PriceObservation;

/// `Date,Price` rows. Neither column can contain a comma or a quote.
pub fn export_history_csv(history: &[PriceObservation]) -> String {
    let mut out = String::from("Date,Price\n");
    for obs in history {
        out.push_str(&format!(
            "{},{}\n",
            obs.observed_at.format("%Y-%m-%d %H:%M:%S"),
            obs.price
        ));
    }
    out
}
