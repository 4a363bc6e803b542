//! Pure helpers that turn loosely typed input into canonical strings and tables.
//!
//! Dates are always rendered as `YYYY-MM-DD` in UTC. Numeric input is read as a
//! spreadsheet day serial in the 1900 date system, including its phantom
//! 1900-02-29 (serial 60).

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde_json::Value;

/// Header row of every array result
pub const ARRAY_HEADER: [&str; 2] = ["Date", "Value"];

/// Largest serial a spreadsheet accepts (9999-12-31)
const MAX_SERIAL: f64 = 2_958_465.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// A date-like value as it arrives from the host or the wire
#[derive(Debug, Clone, PartialEq)]
pub enum DateInput {
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Serial(f64),
    Text(String),
}

impl From<NaiveDate> for DateInput {
    fn from(date: NaiveDate) -> Self {
        DateInput::Date(date)
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(dt: DateTime<Utc>) -> Self {
        DateInput::DateTime(dt)
    }
}

impl From<f64> for DateInput {
    fn from(serial: f64) -> Self {
        DateInput::Serial(serial)
    }
}

impl From<i64> for DateInput {
    fn from(serial: i64) -> Self {
        DateInput::Serial(serial as f64)
    }
}

impl From<&str> for DateInput {
    fn from(text: &str) -> Self {
        DateInput::Text(text.to_string())
    }
}

impl From<String> for DateInput {
    fn from(text: String) -> Self {
        DateInput::Text(text)
    }
}

impl TryFrom<&Value> for DateInput {
    type Error = NormalizeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(DateInput::Text(s.clone())),
            Value::Number(n) => n
                .as_f64()
                .map(DateInput::Serial)
                .ok_or_else(|| NormalizeError::InvalidDate(n.to_string())),
            other => Err(NormalizeError::InvalidDate(other.to_string())),
        }
    }
}

/// Trim a nullable string. Blank input stays an empty string.
pub fn normalize_optional_string(input: Option<&str>) -> Option<String> {
    input.map(|s| s.trim().to_string())
}

/// Trim a nullable string and drop it when nothing is left.
pub fn non_empty_trimmed(input: Option<&str>) -> Option<String> {
    normalize_optional_string(input).filter(|s| !s.is_empty())
}

/// Render any supported date representation as `YYYY-MM-DD`.
pub fn normalize_date_input(input: &DateInput) -> Result<String, NormalizeError> {
    let date = match input {
        DateInput::Date(date) => *date,
        DateInput::DateTime(dt) => dt.date_naive(),
        DateInput::Serial(serial) => serial_to_date(*serial)?,
        DateInput::Text(text) => parse_date_text(text)?,
    };
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Convert a 1900-system day serial to a calendar date.
///
/// Serial 1 is 1900-01-01. Serial 60 is the nonexistent 1900-02-29 and maps to
/// 1900-02-28. From serial 61 onward every serial counts days from 1899-12-30.
/// Any time-of-day fraction is dropped.
pub fn serial_to_date(serial: f64) -> Result<NaiveDate, NormalizeError> {
    if !serial.is_finite() || !(0.0..=MAX_SERIAL).contains(&serial) {
        return Err(NormalizeError::InvalidDate(serial.to_string()));
    }

    let days = serial.trunc() as u64;
    let (base, offset) = match days {
        0..=59 => (NaiveDate::from_ymd_opt(1899, 12, 31), days),
        60 => (NaiveDate::from_ymd_opt(1900, 2, 28), 0),
        _ => (NaiveDate::from_ymd_opt(1899, 12, 30), days),
    };

    base.and_then(|b| b.checked_add_days(Days::new(offset)))
        .ok_or_else(|| NormalizeError::InvalidDate(serial.to_string()))
}

fn parse_date_text(text: &str) -> Result<NaiveDate, NormalizeError> {
    let trimmed = text.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc).date_naive());
    }
    // Serials sometimes travel as text
    match trimmed.parse::<f64>() {
        Ok(serial) => serial_to_date(serial),
        Err(_) => Err(NormalizeError::InvalidDate(text.to_string())),
    }
}

/// Shape `[date, value]` pairs into a header-first table sorted newest first.
///
/// Equal dates keep their input order. The input is only borrowed.
pub fn build_array_result(rows: &[(DateInput, Value)]) -> Result<Vec<Vec<Value>>, NormalizeError> {
    let mut body = rows
        .iter()
        .map(|(date, value)| Ok((normalize_date_input(date)?, value.clone())))
        .collect::<Result<Vec<(String, Value)>, NormalizeError>>()?;

    // Vec::sort_by is stable
    body.sort_by(|a, b| b.0.cmp(&a.0));

    let mut table = Vec::with_capacity(body.len() + 1);
    table.push(ARRAY_HEADER.iter().map(|h| Value::String(h.to_string())).collect());
    table.extend(
        body.into_iter()
            .map(|(date, value)| vec![Value::String(date), value]),
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_optional_string_nullish_and_trim() {
        assert_eq!(normalize_optional_string(None), None);
        assert_eq!(normalize_optional_string(Some(" abc ")), Some("abc".to_string()));
        assert_eq!(normalize_optional_string(Some("   ")), Some(String::new()));
        assert_eq!(non_empty_trimmed(Some("   ")), None);
        assert_eq!(non_empty_trimmed(Some(" key ")), Some("key".to_string()));
    }

    #[test]
    fn test_known_serial_matches_calendar_date() {
        let calendar = DateInput::from(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(normalize_date_input(&calendar).unwrap(), "2024-01-01");
        assert_eq!(normalize_date_input(&DateInput::from(45292_i64)).unwrap(), "2024-01-01");
    }

    #[test]
    fn test_datetime_ignores_time_of_day() {
        let dt = DateTime::parse_from_rfc3339("2024-03-05T23:59:59Z").unwrap().with_timezone(&Utc);
        assert_eq!(normalize_date_input(&DateInput::from(dt)).unwrap(), "2024-03-05");

        let offset = DateInput::from("2024-03-05T23:30:00-05:00");
        assert_eq!(normalize_date_input(&offset).unwrap(), "2024-03-06");
    }

    #[test]
    fn test_serial_1900_leap_year_convention() {
        assert_eq!(serial_to_date(1.0).unwrap(), NaiveDate::from_ymd_opt(1900, 1, 1).unwrap());
        assert_eq!(serial_to_date(59.0).unwrap(), NaiveDate::from_ymd_opt(1900, 2, 28).unwrap());
        assert_eq!(serial_to_date(60.0).unwrap(), NaiveDate::from_ymd_opt(1900, 2, 28).unwrap());
        assert_eq!(serial_to_date(61.0).unwrap(), NaiveDate::from_ymd_opt(1900, 3, 1).unwrap());
        assert_eq!(serial_to_date(73050.0).unwrap(), NaiveDate::from_ymd_opt(2099, 12, 31).unwrap());
    }

    #[test]
    fn test_serial_fraction_is_truncated() {
        assert_eq!(normalize_date_input(&DateInput::Serial(45292.99)).unwrap(), "2024-01-01");
    }

    #[test]
    fn test_invalid_dates() {
        assert!(matches!(
            normalize_date_input(&DateInput::Serial(f64::NAN)),
            Err(NormalizeError::InvalidDate(_))
        ));
        assert!(normalize_date_input(&DateInput::Serial(-1.0)).is_err());
        assert!(normalize_date_input(&DateInput::Serial(f64::INFINITY)).is_err());
        assert!(normalize_date_input(&DateInput::from("next tuesday")).is_err());
        assert!(DateInput::try_from(&json!(true)).is_err());
    }

    #[test]
    fn test_text_serial_is_accepted() {
        assert_eq!(normalize_date_input(&DateInput::from("45292")).unwrap(), "2024-01-01");
    }

    #[test]
    fn test_build_array_result_header_and_order() {
        let rows = vec![
            (DateInput::from("2023-01-01"), json!(1)),
            (DateInput::from("2024-01-01"), json!(2)),
        ];
        let result = build_array_result(&rows).unwrap();
        assert_eq!(
            result,
            vec![
                vec![json!("Date"), json!("Value")],
                vec![json!("2024-01-01"), json!(2)],
                vec![json!("2023-01-01"), json!(1)],
            ]
        );
    }

    #[test]
    fn test_build_array_result_is_stable_and_leaves_input_alone() {
        let rows = vec![
            (DateInput::from("2024-01-01"), json!("first")),
            (DateInput::from(45292_i64), json!("second")),
            (DateInput::from("2025-06-30"), json!("third")),
        ];
        let snapshot = rows.clone();

        let result = build_array_result(&rows).unwrap();
        assert_eq!(rows, snapshot);
        assert_eq!(result[1], vec![json!("2025-06-30"), json!("third")]);
        assert_eq!(result[2], vec![json!("2024-01-01"), json!("first")]);
        assert_eq!(result[3], vec![json!("2024-01-01"), json!("second")]);
    }

    #[test]
    fn test_build_array_result_empty_and_invalid() {
        assert_eq!(build_array_result(&[]).unwrap().len(), 1);
        let rows = vec![(DateInput::from("garbage"), json!(1))];
        assert!(build_array_result(&rows).is_err());
    }
}
