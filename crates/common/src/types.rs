use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Logical type of one declared output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Boolean,
    Int64,
    Float64,
    Utf8,
    Date,
    Timestamp,
}

const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(f64),
    Utf8(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

/// One fixed-width record, fields in declared output order.
pub type Row = Vec<Value>;

impl Value {
    /// Parses a configured literal string into the declared type.
    ///
    /// `format` is an optional chrono format string, honored for `Date` and
    /// `Timestamp` literals only. A parse failure is a configuration error.
    pub fn parse_literal(text: &str, data_type: DataType, format: Option<&str>) -> Result<Value> {
        let text = text.trim();
        match data_type {
            DataType::Boolean => text
                .parse::<bool>()
                .map(Value::Boolean)
                .map_err(|_| Error::config(format!("invalid boolean literal '{text}'"))),
            DataType::Int64 => text
                .parse::<i64>()
                .map(Value::Int64)
                .map_err(|_| Error::config(format!("invalid int64 literal '{text}'"))),
            DataType::Float64 => text
                .parse::<f64>()
                .map(Value::Float64)
                .map_err(|_| Error::config(format!("invalid float64 literal '{text}'"))),
            DataType::Utf8 => Ok(Value::Utf8(text.to_string())),
            DataType::Date => {
                let fmt = format.unwrap_or(DEFAULT_DATE_FORMAT);
                NaiveDate::parse_from_str(text, fmt)
                    .map(Value::Date)
                    .map_err(|e| Error::config(format!("invalid date literal '{text}': {e}")))
            }
            DataType::Timestamp => {
                let fmt = format.unwrap_or(DEFAULT_TIMESTAMP_FORMAT);
                NaiveDateTime::parse_from_str(text, fmt)
                    .map(Value::Timestamp)
                    .map_err(|e| Error::config(format!("invalid timestamp literal '{text}': {e}")))
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Utf8(v) => write!(f, "{v}"),
            Value::Date(v) => write!(f, "{v}"),
            Value::Timestamp(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_scalar_literals() {
        assert_eq!(
            Value::parse_literal("42", DataType::Int64, None).unwrap(),
            Value::Int64(42)
        );
        assert_eq!(
            Value::parse_literal("true", DataType::Boolean, None).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            Value::parse_literal("1.5", DataType::Float64, None).unwrap(),
            Value::Float64(1.5)
        );
        assert_eq!(
            Value::parse_literal("hello", DataType::Utf8, None).unwrap(),
            Value::Utf8("hello".to_string())
        );
    }

    #[test]
    fn parse_temporal_literals() {
        let date = Value::parse_literal("2024-03-01", DataType::Date, None).unwrap();
        assert_eq!(
            date,
            Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );

        let custom = Value::parse_literal("01/03/2024", DataType::Date, Some("%d/%m/%Y")).unwrap();
        assert_eq!(custom, date);

        let ts = Value::parse_literal("2024-03-01 12:30:00", DataType::Timestamp, None).unwrap();
        assert_eq!(
            ts,
            Value::Timestamp(
                NaiveDate::from_ymd_opt(2024, 3, 1)
                    .unwrap()
                    .and_hms_opt(12, 30, 0)
                    .unwrap()
            )
        );
    }

    #[test]
    fn invalid_literal_is_configuration_error() {
        let err = Value::parse_literal("abc", DataType::Int64, None).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)), "got {err:?}");

        let err = Value::parse_literal("not-a-date", DataType::Date, None).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)), "got {err:?}");
    }
}
