//! en-US display formatting for counts, currency, prices and dates.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

use crate::api::types::MarketStatus;

/// Insert thousands separators into a string of ASCII digits.
fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn format_count(value: u64) -> String {
    group_digits(&value.to_string())
}

/// Grouped number with at most three fraction digits, trailing zeros dropped.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{:.3}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::new();
    if value < 0.0 && (int_part != "0" || !frac_part.is_empty()) {
        out.push('-');
    }
    out.push_str(&group_digits(int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

pub fn format_usd(value: f64) -> String {
    let number = format_number(value);
    match number.strip_prefix('-') {
        Some(abs) => format!("-${}", abs),
        None => format!("${}", number),
    }
}

/// Two-decimal price, e.g. `$0.65`.
pub fn format_price(value: f64) -> String {
    if value < 0.0 {
        format!("-${:.2}", value.abs())
    } else {
        format!("${:.2}", value)
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    None
}

pub fn format_date_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match parse_timestamp(raw) {
        Some(dt) => dt.with_timezone(tz).format("%-m/%-d/%Y").to_string(),
        None => raw.to_string(),
    }
}

pub fn format_timestamp_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match parse_timestamp(raw) {
        Some(dt) => dt
            .with_timezone(tz)
            .format("%-m/%-d/%Y, %-I:%M:%S %p")
            .to_string(),
        None => raw.to_string(),
    }
}

pub fn format_date(raw: &str) -> String {
    format_date_in(raw, &Local)
}

pub fn format_timestamp(raw: &str) -> String {
    format_timestamp_in(raw, &Local)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Success,
    Info,
    Error,
    Default,
}

pub fn status_tone(status: &MarketStatus) -> StatusTone {
    match status {
        MarketStatus::Active => StatusTone::Success,
        MarketStatus::Resolved => StatusTone::Info,
        MarketStatus::Cancelled => StatusTone::Error,
        MarketStatus::Other(_) => StatusTone::Default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(50), "50");
        assert_eq!(format_count(3400), "3,400");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(1_000_000.0), "$1,000,000");
        assert_eq!(format_usd(125_000.5), "$125,000.5");
        assert_eq!(format_usd(0.12345), "$0.123");
        assert_eq!(format_usd(999.9999), "$1,000");
        assert_eq!(format_usd(-2500.0), "-$2,500");
        assert_eq!(format_usd(0.0), "$0");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0.65), "$0.65");
        assert_eq!(format_price(0.5), "$0.50");
        assert_eq!(format_price(1.0), "$1.00");
    }

    #[test]
    fn test_format_dates() {
        assert_eq!(format_date_in("2024-06-30T00:00:00Z", &Utc), "6/30/2024");
        assert_eq!(format_date_in("2024-01-05", &Utc), "1/5/2024");
        assert_eq!(format_date_in("soon", &Utc), "soon");
        assert_eq!(
            format_timestamp_in("2024-01-03T14:05:09Z", &Utc),
            "1/3/2024, 2:05:09 PM"
        );
        assert_eq!(
            format_timestamp_in("2024-01-03T00:00:00+00:00", &Utc),
            "1/3/2024, 12:00:00 AM"
        );
    }

    #[test]
    fn test_status_tone() {
        assert_eq!(status_tone(&MarketStatus::parse("Active")), StatusTone::Success);
        assert_eq!(status_tone(&MarketStatus::Resolved), StatusTone::Info);
        assert_eq!(status_tone(&MarketStatus::Cancelled), StatusTone::Error);
        assert_eq!(status_tone(&MarketStatus::parse("paused")), StatusTone::Default);
    }
}
