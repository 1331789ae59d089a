//! Display formatting shared by all renderers.
//!
//! Numbers use a decimal point and a space before the unit, money groups
//! thousands with a space, dates are `dd/mm/yyyy` and times `HH:MM`. A
//! non-finite value is printed as zero.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Whether a category line should be hidden.
///
/// A line is empty when its count is zero and its amount, if the category
/// tracks one, is zero too. Every renderer hides empty lines; how the
/// hidden state shows up (omission, placeholder) is up to the renderer.
#[must_use]
pub fn is_category_empty(count: u64, amount: Option<f64>) -> bool {
    count == 0 && amount.is_none_or(|amount| amount == 0.0 || !amount.is_finite())
}

fn finite(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Fixed-precision decimal (`6.67`).
#[must_use]
pub fn format_decimal(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, finite(value))
}

/// Percentage with the given precision (`6.67 %`).
#[must_use]
pub fn format_rate(rate: f64, decimals: usize) -> String {
    format!("{} %", format_decimal(rate, decimals))
}

/// Monetary amount with two decimals (`1 234.50 €`).
#[must_use]
pub fn format_amount(amount: f64) -> String {
    let fixed = format_decimal(amount, 2);
    let (sign, digits) = fixed
        .strip_prefix('-')
        .map_or(("", fixed.as_str()), |rest| ("-", rest));
    let (integer, fraction) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    format!("{sign}{grouped}.{fraction} €")
}

/// Plain count.
#[must_use]
pub fn format_count(count: u64) -> String {
    count.to_string()
}

/// Calendar date (`14/03/2025`).
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Time of day (`08:45`).
#[must_use]
pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Generation stamp (`14/03/2025 à 08:45`).
#[must_use]
pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    format!(
        "{} à {}",
        format_date(timestamp.date()),
        format_time(timestamp.time())
    )
}

/// Human-readable label for an optional date range.
#[must_use]
pub fn date_range_label(from: Option<NaiveDate>, to: Option<NaiveDate>) -> String {
    match (from, to) {
        (Some(f), Some(t)) if f == t => format!("le {}", format_date(f)),
        (Some(f), Some(t)) => format!("du {} au {}", format_date(f), format_date(t)),
        (Some(f), None) => format!("depuis le {}", format_date(f)),
        (None, Some(t)) => format!("jusqu'au {}", format_date(t)),
        (None, None) => "toutes périodes".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_predicate() {
        assert!(is_category_empty(0, None));
        assert!(is_category_empty(0, Some(0.0)));
        assert!(!is_category_empty(1, Some(0.0)));
        assert!(!is_category_empty(0, Some(12.0)));
        assert!(!is_category_empty(2, None));
    }

    #[test]
    fn rates_round_to_precision() {
        assert_eq!(format_rate(10.0 / 150.0 * 100.0, 2), "6.67 %");
        assert_eq!(format_rate(10.0 / 150.0 * 100.0, 1), "6.7 %");
        assert_eq!(format_rate(0.0, 2), "0.00 %");
    }

    #[test]
    fn non_finite_prints_zero() {
        assert_eq!(format_rate(f64::NAN, 1), "0.0 %");
        assert_eq!(format_amount(f64::INFINITY), "0.00 €");
    }

    #[test]
    fn formats_dates_and_ranges() {
        let from = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        assert_eq!(format_date(from), "01/03/2025");
        assert_eq!(
            date_range_label(Some(from), Some(to)),
            "du 01/03/2025 au 31/03/2025"
        );
        assert_eq!(date_range_label(Some(from), Some(from)), "le 01/03/2025");
        assert_eq!(date_range_label(None, Some(to)), "jusqu'au 31/03/2025");
        assert_eq!(date_range_label(None, None), "toutes périodes");
    }

    #[test]
    fn formats_amounts() {
        assert_eq!(format_amount(150.0), "150.00 €");
        assert_eq!(format_amount(42.5), "42.50 €");
        assert_eq!(format_amount(1234.5), "1 234.50 €");
        assert_eq!(format_amount(1_000_000.0), "1 000 000.00 €");
        assert_eq!(format_amount(-1500.0), "-1 500.00 €");
    }
}
