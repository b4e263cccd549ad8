//! Date normalization for spreadsheet-sourced records.
//!
//! A single date column can hold ISO strings, spreadsheet serial numbers and
//! locale-formatted `MM/DD/YYYY` strings side by side (typically after several
//! re-uploads of the same sheet). [`normalize`] is total: every input either
//! yields a calendar date or a [`ParseFailure`], and callers decide what to
//! exclude.
//!
//! Serial numbers count days from 1899-12-30. That epoch is the usual
//! spreadsheet convention (it absorbs the phantom 1900-02-29) and is kept
//! as-is so serials round-trip with the sheets that produced them.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// `NaiveDate::num_days_from_ce` of 1899-12-30, serial day zero.
const SERIAL_EPOCH_CE: i32 = 693_594;

/// Serial of 9999-12-31, the last date spreadsheets represent.
const MAX_SERIAL: f64 = 2_958_465.0;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A raw date as it arrives from storage or an uploaded sheet.
///
/// Deserialized untagged: `"2025-03-04"` becomes `Date`, a JSON number
/// becomes `Serial`, any other string becomes `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Date(NaiveDate),
    Serial(f64),
    Text(String),
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateValue::Date(d) => write!(f, "{}", d),
            DateValue::Serial(n) => write!(f, "{}", n),
            DateValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<NaiveDate> for DateValue {
    fn from(d: NaiveDate) -> Self {
        DateValue::Date(d)
    }
}

impl From<f64> for DateValue {
    fn from(n: f64) -> Self {
        DateValue::Serial(n)
    }
}

impl From<&str> for DateValue {
    fn from(s: &str) -> Self {
        DateValue::Text(s.to_string())
    }
}

/// A date value that could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("cannot parse date '{input}': {reason}")]
pub struct ParseFailure {
    pub input: String,
    pub reason: String,
}

impl ParseFailure {
    fn new(input: impl fmt::Display, reason: &str) -> Self {
        ParseFailure {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Outcome of resolving an optional date field on a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateField {
    Missing,
    Parsed(NaiveDate),
    Unparseable(ParseFailure),
}

impl DateField {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DateField::Parsed(d) => Some(*d),
            _ => None,
        }
    }

    pub fn year(&self) -> Option<i32> {
        self.date().map(|d| d.year())
    }

    pub fn failure(&self) -> Option<&ParseFailure> {
        match self {
            DateField::Unparseable(f) => Some(f),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Interpret a raw date value.
///
/// Order of attempts for text: ISO/standard forms, then a numeric string as
/// a serial number, then `MM/DD/YYYY` (month first, four-digit year).
pub fn normalize(value: &DateValue) -> Result<NaiveDate, ParseFailure> {
    match value {
        DateValue::Date(d) => Ok(*d),
        DateValue::Serial(n) => {
            from_serial(*n).ok_or_else(|| ParseFailure::new(value, "serial number out of range"))
        }
        DateValue::Text(s) => normalize_text(s),
    }
}

/// Resolve an optional raw date into a [`DateField`].
pub fn resolve(value: Option<&DateValue>) -> DateField {
    match value {
        None => DateField::Missing,
        Some(DateValue::Text(s)) if s.trim().is_empty() => DateField::Missing,
        Some(v) => match normalize(v) {
            Ok(d) => DateField::Parsed(d),
            Err(f) => DateField::Unparseable(f),
        },
    }
}

/// Spreadsheet serial number to date. Fractional days (time of day) are
/// dropped.
pub fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(0.0..=MAX_SERIAL).contains(&serial) {
        return None;
    }
    let days = serial.floor() as i32;
    NaiveDate::from_num_days_from_ce_opt(SERIAL_EPOCH_CE + days)
}

/// Date to spreadsheet serial number.
pub fn to_serial(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce() - SERIAL_EPOCH_CE)
}

/// Date to `YYYY-MM-DD`.
pub fn to_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn normalize_text(raw: &str) -> Result<NaiveDate, ParseFailure> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(ParseFailure::new(raw, "empty date"));
    }
    if let Some(d) = parse_standard(s) {
        return Ok(d);
    }
    if let Ok(n) = s.parse::<f64>() {
        return from_serial(n).ok_or_else(|| ParseFailure::new(raw, "serial number out of range"));
    }
    if s.matches('/').count() == 2 {
        return parse_month_first(s);
    }
    Err(ParseFailure::new(raw, "unrecognised date format"))
}

fn parse_standard(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
}

/// `MM/DD/YYYY`, optionally followed by a time which is ignored.
fn parse_month_first(s: &str) -> Result<NaiveDate, ParseFailure> {
    let date_part = s.split_whitespace().next().unwrap_or(s);
    let parts: Vec<&str> = date_part.split('/').map(str::trim).collect();
    let [month, day, year] = parts.as_slice() else {
        return Err(ParseFailure::new(s, "expected MM/DD/YYYY"));
    };
    if year.len() != 4 {
        return Err(ParseFailure::new(s, "year must have four digits"));
    }
    let month: u32 = month
        .parse()
        .map_err(|_| ParseFailure::new(s, "month is not a number"))?;
    let day: u32 = day
        .parse()
        .map_err(|_| ParseFailure::new(s, "day is not a number"))?;
    let year: i32 = year
        .parse()
        .map_err(|_| ParseFailure::new(s, "year is not a number"))?;
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| ParseFailure::new(s, "no such calendar date"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_first_not_day_first() {
        let d = normalize(&"03/04/2025".into()).unwrap();
        assert_eq!(d, ymd(2025, 3, 4));
    }

    #[test]
    fn test_month_first_with_time_suffix() {
        let d = normalize(&"3/4/2025 0:00".into()).unwrap();
        assert_eq!(d, ymd(2025, 3, 4));
    }

    #[test]
    fn test_month_first_rejects_impossible_date() {
        // 13th month is not rolled into the next year
        assert!(normalize(&"13/01/2025".into()).is_err());
        assert!(normalize(&"02/30/2025".into()).is_err());
    }

    #[test]
    fn test_month_first_rejects_two_digit_year() {
        let err = normalize(&"03/04/25".into()).unwrap_err();
        assert_eq!(err.reason, "year must have four digits");
    }

    #[test]
    fn test_iso_forms() {
        assert_eq!(normalize(&"2025-03-04".into()).unwrap(), ymd(2025, 3, 4));
        assert_eq!(
            normalize(&"2025-03-04T10:15:00Z".into()).unwrap(),
            ymd(2025, 3, 4)
        );
        assert_eq!(
            normalize(&"2025-03-04 23:59:59".into()).unwrap(),
            ymd(2025, 3, 4)
        );
        assert_eq!(normalize(&"2025/03/04".into()).unwrap(), ymd(2025, 3, 4));
    }

    #[test]
    fn test_serial_number() {
        assert_eq!(normalize(&DateValue::Serial(45720.0)).unwrap(), ymd(2025, 3, 4));
        // time-of-day fraction dropped
        assert_eq!(normalize(&DateValue::Serial(45720.75)).unwrap(), ymd(2025, 3, 4));
        assert_eq!(from_serial(0.0).unwrap(), ymd(1899, 12, 30));
    }

    #[test]
    fn test_serial_in_text() {
        assert_eq!(normalize(&"45658".into()).unwrap(), ymd(2025, 1, 1));
    }

    #[test]
    fn test_serial_out_of_range() {
        assert!(normalize(&DateValue::Serial(-1.0)).is_err());
        assert!(normalize(&f64::NAN.into()).is_err());
        assert!(normalize(&f64::INFINITY.into()).is_err());
        assert!(normalize(&DateValue::Serial(3_000_000.0)).is_err());
    }

    #[test]
    fn test_garbage_is_failure_not_panic() {
        for s in ["", "   ", "yesterday", "2025-13-45", "1/2/3/4", "//"] {
            assert!(normalize(&DateValue::Text(s.into())).is_err(), "{s}");
        }
    }

    #[test]
    fn test_serial_round_trip() {
        for d in [ymd(1900, 3, 1), ymd(2024, 2, 29), ymd(2025, 12, 31)] {
            assert_eq!(normalize(&DateValue::Serial(to_serial(d))).unwrap(), d);
        }
    }

    #[test]
    fn test_iso_round_trip() {
        for d in [ymd(1999, 1, 1), ymd(2024, 2, 29), ymd(2025, 3, 4)] {
            assert_eq!(normalize(&DateValue::Text(to_iso(d))).unwrap(), d);
        }
    }

    #[test]
    fn test_resolve_variants() {
        assert_eq!(resolve(None), DateField::Missing);
        assert_eq!(resolve(Some(&"  ".into())), DateField::Missing);
        assert_eq!(
            resolve(Some(&"2025-01-31".into())).year(),
            Some(2025)
        );
        assert!(resolve(Some(&"not a date".into())).failure().is_some());
    }

    #[test]
    fn test_untagged_deserialization() {
        let v: Vec<DateValue> = serde_json::from_str(r#"["2025-03-04", 45720, "03/04/2025"]"#).unwrap();
        assert_eq!(v[0], DateValue::Date(ymd(2025, 3, 4)));
        assert_eq!(v[1], DateValue::Serial(45720.0));
        assert_eq!(v[2], DateValue::Text("03/04/2025".into()));
    }
}
