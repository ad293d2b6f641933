use chrono::{Datelike, NaiveDate};

/// Internal document numbers use the format `{n}/{yy}` — a per-year
/// counter with a two-digit year suffix, e.g. "17/26". The counter is
/// derived from the highest number already stored for the year, so the
/// sequence survives restarts without a separate counter table.

/// Two-digit year suffix for a date.
pub fn year_suffix(date: NaiveDate) -> String {
    format!("{:02}", date.year() % 100)
}

/// Parse the numeric prefix of a document number ("17/26" → 17).
/// Returns `None` for numbers not in the `{n}/{yy}` shape.
pub fn document_seq(number: &str) -> Option<i64> {
    let (prefix, _) = number.split_once('/')?;
    prefix.trim().parse().ok()
}

/// Format the next document number for a year, given the highest sequence
/// number already in use (`None` when the year has no documents yet).
pub fn next_document_number(max_in_year: Option<i64>, year_suffix: &str) -> String {
    let next = max_in_year.map_or(1, |n| n + 1);
    format!("{next}/{year_suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn year_suffix_two_digits() {
        assert_eq!(year_suffix(date(2026, 3, 1)), "26");
        assert_eq!(year_suffix(date(2009, 3, 1)), "09");
    }

    #[test]
    fn parse_document_seq() {
        assert_eq!(document_seq("17/26"), Some(17));
        assert_eq!(document_seq("1/09"), Some(1));
        assert_eq!(document_seq("KALK-17"), None);
        assert_eq!(document_seq(""), None);
    }

    #[test]
    fn first_and_next_numbers() {
        assert_eq!(next_document_number(None, "26"), "1/26");
        assert_eq!(next_document_number(Some(17), "26"), "18/26");
    }
}
