//! Text encodings for date, timestamp and decimal columns.
//!
//! Dates are written as `YYYY-MM-DD` and timestamps as RFC 3339 UTC with
//! fixed microsecond precision, so lexical order equals time order.
//! Reads are lenient for dates (bad text becomes `None`) because older
//! databases stored whatever the form produced.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::ValueRef;
use rust_decimal::Decimal;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Current time truncated to the precision that survives a round-trip.
pub(crate) fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn parse_date_lenient(value: Option<&str>) -> Option<NaiveDate> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Some(date);
    }
    parse_timestamp(trimmed).map(|ts| ts.date_naive())
}

pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses RFC 3339, or a naive ISO datetime interpreted as UTC.
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(ts.with_timezone(&Utc));
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
}

/// Keeps the scale as entered, so `250000.50` reads back as `250000.50`.
pub(crate) fn format_decimal(amount: Decimal) -> String {
    amount.to_string()
}

/// Reads a decimal stored as TEXT, or as REAL/INTEGER by older writers.
pub(crate) fn decimal_from_value(value: ValueRef<'_>) -> Option<Decimal> {
    match value {
        ValueRef::Null => Some(Decimal::ZERO),
        ValueRef::Integer(int) => Some(Decimal::from(int)),
        ValueRef::Real(real) => Decimal::try_from(real).ok(),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .ok()
            .and_then(|text| Decimal::from_str(text.trim()).ok()),
        ValueRef::Blob(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        decimal_from_value, format_timestamp, parse_date_lenient, parse_timestamp,
    };
    use chrono::{NaiveDate, TimeZone, Utc};
    use rusqlite::types::ValueRef;
    use rust_decimal::Decimal;

    #[test]
    fn dates_parse_from_plain_and_datetime_text() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 20).unwrap();
        assert_eq!(parse_date_lenient(Some("2026-03-20")), Some(expected));
        assert_eq!(
            parse_date_lenient(Some("2026-03-20T00:00:00")),
            Some(expected)
        );
        assert_eq!(
            parse_date_lenient(Some("2026-03-20T10:15:00+03:00")),
            Some(expected)
        );
    }

    #[test]
    fn unparsable_dates_become_missing() {
        assert_eq!(parse_date_lenient(Some("next tuesday")), None);
        assert_eq!(parse_date_lenient(Some("")), None);
        assert_eq!(parse_date_lenient(None), None);
    }

    #[test]
    fn timestamps_round_trip_and_accept_naive_iso() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(parse_timestamp(&format_timestamp(ts)), Some(ts));
        assert_eq!(parse_timestamp("2026-01-02T03:04:05.000000"), Some(ts));
    }

    #[test]
    fn decimals_read_from_any_numeric_storage_class() {
        assert_eq!(
            decimal_from_value(ValueRef::Text(b"1250.50")),
            Some(Decimal::new(125050, 2))
        );
        assert_eq!(
            decimal_from_value(ValueRef::Integer(250000)),
            Some(Decimal::from(250000))
        );
        assert_eq!(
            decimal_from_value(ValueRef::Real(150000.0)),
            Some(Decimal::from(150000))
        );
        assert_eq!(decimal_from_value(ValueRef::Text(b"lots")), None);
    }
}
