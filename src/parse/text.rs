use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Values suppliers use to mean "no value".
static SENTINELS: &[&str] = &["", "0", "0000", "0000-00-00", "None"];

/// Parse a decimal field, accepting both `.` and `,` as the decimal
/// separator. Missing or unparseable values yield `default` — invoices
/// with partially populated numerics are normal, not an error.
pub fn parse_decimal(text: Option<&str>, default: Decimal) -> Decimal {
    let Some(text) = text else { return default };
    let normalized = text.trim().replace(',', ".");
    if normalized.is_empty() {
        return default;
    }
    Decimal::from_str(&normalized).unwrap_or(default)
}

/// Parse an optional decimal field; `None` when absent or unparseable.
pub fn parse_decimal_opt(text: Option<&str>) -> Option<Decimal> {
    let normalized = text?.trim().replace(',', ".");
    Decimal::from_str(&normalized).ok()
}

/// Parse a `YYYY-MM-DD` date. Sentinel values normalize to `None`.
pub fn parse_date(text: Option<&str>) -> Option<NaiveDate> {
    let text = text?.trim();
    if SENTINELS.contains(&text) {
        return None;
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Normalize a free-text field, mapping sentinel values to `None`.
pub fn clean_text(text: Option<&str>) -> Option<String> {
    let text = text?.trim();
    if SENTINELS.contains(&text) {
        None
    } else {
        Some(text.to_string())
    }
}
