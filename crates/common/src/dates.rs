//! Calendar-date parsing for trade and expiration dates.
//!
//! Trades arrive with plain `YYYY-MM-DD` dates, but clients occasionally send
//! full timestamps. Only the calendar date as written is kept, so day counts
//! never drift with time-of-day or the server's timezone.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

/// Parse a calendar date from `YYYY-MM-DD`, RFC 3339, or a naive
/// `YYYY-MM-DDTHH:MM:SS` timestamp.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        // Keep the date in the offset it was written in.
        return Some(ts.date_naive());
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|ts| ts.date())
}

/// Serde adapter for [`parse_calendar_date`].
pub fn deserialize_calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid calendar date: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_plain_date() {
        assert_eq!(parse_calendar_date("2024-01-11"), Some(date(2024, 1, 11)));
        assert_eq!(parse_calendar_date(" 2024-01-11 "), Some(date(2024, 1, 11)));
    }

    #[test]
    fn test_timestamp_keeps_written_date() {
        // Late evening with a negative offset would be the next day in UTC.
        assert_eq!(
            parse_calendar_date("2024-03-01T23:30:00-05:00"),
            Some(date(2024, 3, 1))
        );
        assert_eq!(
            parse_calendar_date("2024-03-01T00:00:00Z"),
            Some(date(2024, 3, 1))
        );
        assert_eq!(
            parse_calendar_date("2024-03-01T09:15:00"),
            Some(date(2024, 3, 1))
        );
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_calendar_date("not a date"), None);
        assert_eq!(parse_calendar_date("2024-13-01"), None);
        assert_eq!(parse_calendar_date(""), None);
    }
}
