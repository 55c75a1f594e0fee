// src/domain/price.rs

use rust_decimal::Decimal;
use std::str::FromStr;

/// Extracts a positive amount from scraped price text such as
/// `"₹1,23,999.00"`, `"Rs. 1,299"` or `"999."`. The first run of digits
/// wins; comma is always treated as a thousands separator. Returns `None` for
/// empty, unparsable or non-positive text.
pub fn parse_price_text(text: &str) -> Option<Decimal> {
    let number = first_number(text)?;
    let price = Decimal::from_str(&number).ok()?;
    if price > Decimal::ZERO {
        Some(price.normalize())
    } else {
        None
    }
}

/// A digit, then digits or commas, then optionally `.` and more digits.
/// Commas are dropped. A point with no digit after it ends the run, which
/// covers Amazon's `a-price-whole` rendering "1,299.".
fn first_number(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let start = chars.iter().position(|c| c.is_ascii_digit())?;

    let mut out = String::new();
    let mut i = start;
    while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == ',') {
        if chars[i] != ',' {
            out.push(chars[i]);
        }
        i += 1;
    }

    if chars.get(i) == Some(&'.') && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()) {
        out.push('.');
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            out.push(chars[i]);
            i += 1;
        }
    }

    Some(out)
}

/// Relative decrease from `old` to `new`, in percent. Zero when `old` is not
/// positive.
pub fn drop_percent(old: Decimal, new: Decimal) -> Decimal {
    if old <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (old - new) / old * Decimal::ONE_HUNDRED
}

/// Decides whether a fresh observation counts as a drop worth notifying.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DropPolicy {
    /// When set, the relative decrease must also reach this percentage.
    pub min_drop_percent: Option<Decimal>,
}

impl DropPolicy {
    pub fn new(min_drop_percent: Option<Decimal>) -> Self {
        Self { min_drop_percent }
    }

    /// A drop needs a baseline, a strict decrease, and a new price at or under
    /// the threshold. A flat price below the threshold never re-fires.
    pub fn is_drop(&self, old: Option<Decimal>, new: Decimal, threshold: Decimal) -> bool {
        let Some(old) = old else {
            return false;
        };

        if new >= old || new > threshold {
            return false;
        }

        match self.min_drop_percent {
            Some(min) => drop_percent(old, new) >= min,
            None => true,
        }
    }
}
