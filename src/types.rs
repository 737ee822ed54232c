use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::conversion;
use crate::error::SqlBridgeError;

/// Values that can be bound as statement parameters or returned in a fetched row.
///
/// The same enum is used for every driver, so calling code never branches on driver types:
/// ```rust
/// use sql_bridge::prelude::*;
///
/// let params = vec![
///     Value::Int(18),
///     Value::Text("Savings account".into()),
///     sql_bridge::types::date(2008, 2, 27)?,
/// ];
/// # let _ = params;
/// # Ok::<(), SqlBridgeError>(())
/// ```
///
/// Temporal values are only produced by the constructor helpers or by the caller; fetched
/// DATE/TIME/TIMESTAMP columns come back as `Value::Text` in canonical form.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value
    Null,
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Date-only value
    Date(NaiveDate),
    /// Time-only value
    Time(NaiveTime),
    /// Date and time value
    Timestamp(NaiveDateTime),
    /// JSON value
    Json(JsonValue),
    /// Binary data
    Bytes(Vec<u8>),
}

impl Value {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Classify the value in the SQL type taxonomy.
    #[must_use]
    pub fn sql_type(&self) -> SqlType {
        match self {
            Value::Null => SqlType::Null,
            Value::Int(_) => SqlType::Integer,
            Value::Float(_) => SqlType::Double,
            Value::Text(_) => SqlType::Varchar,
            Value::Bool(_) => SqlType::Boolean,
            Value::Date(_) => SqlType::Date,
            Value::Time(_) => SqlType::Time,
            Value::Timestamp(_) => SqlType::Timestamp,
            Value::Json(_) => SqlType::Json,
            Value::Bytes(_) => SqlType::Binary,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        if let Value::Int(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    /// Float value, widening integers.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            Value::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Value::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            Value::Int(1) => Some(true),
            Value::Int(0) => Some(false),
            _ => None,
        }
    }

    /// Timestamp value, parsing canonical text when needed.
    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(value) => Some(*value),
            Value::Date(value) => value.and_hms_opt(0, 0, 0),
            Value::Text(s) => conversion::parse_timestamp(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        if let Value::Bytes(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&JsonValue> {
        if let Value::Json(value) = self {
            Some(value)
        } else {
            None
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => write!(f, "'{s}'"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Date(d) => write!(f, "'{}'", conversion::format_date(d)),
            Value::Time(t) => write!(f, "'{}'", conversion::format_time(t)),
            Value::Timestamp(ts) => write!(f, "'{}'", conversion::format_timestamp(ts)),
            Value::Json(j) => write!(f, "{j}"),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value.into())
                }
            }
        )*
    };
}

value_from! {
    i64 => Int,
    i32 => Int,
    i16 => Int,
    u32 => Int,
    f64 => Float,
    f32 => Float,
    bool => Bool,
    String => Text,
    &str => Text,
    Vec<u8> => Bytes,
    &[u8] => Bytes,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => Timestamp,
    JsonValue => Json,
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Construct a date-only parameter value.
///
/// # Errors
///
/// Returns `SqlBridgeError::BindingError` if the components do not form a calendar date.
pub fn date(year: i32, month: u32, day: u32) -> Result<Value, SqlBridgeError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .map(Value::Date)
        .ok_or_else(|| {
            SqlBridgeError::BindingError(format!("invalid date {year:04}-{month:02}-{day:02}"))
        })
}

/// Construct a time-only parameter value.
///
/// # Errors
///
/// Returns `SqlBridgeError::BindingError` if the components are out of range.
pub fn time(hour: u32, minute: u32, second: u32) -> Result<Value, SqlBridgeError> {
    NaiveTime::from_hms_opt(hour, minute, second)
        .map(Value::Time)
        .ok_or_else(|| {
            SqlBridgeError::BindingError(format!("invalid time {hour:02}:{minute:02}:{second:02}"))
        })
}

/// Construct a date-time parameter value with whole seconds.
///
/// # Errors
///
/// Returns `SqlBridgeError::BindingError` if any component is out of range.
pub fn timestamp(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> Result<Value, SqlBridgeError> {
    timestamp_micros(year, month, day, hour, minute, second, 0)
}

/// Construct a date-time parameter value with microsecond precision.
///
/// # Errors
///
/// Returns `SqlBridgeError::BindingError` if any component is out of range.
pub fn timestamp_micros(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    micros: u32,
) -> Result<Value, SqlBridgeError> {
    let d = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        SqlBridgeError::BindingError(format!("invalid date {year:04}-{month:02}-{day:02}"))
    })?;
    d.and_hms_micro_opt(hour, minute, second, micros)
        .map(Value::Timestamp)
        .ok_or_else(|| {
            SqlBridgeError::BindingError(format!(
                "invalid time {hour:02}:{minute:02}:{second:02}.{micros:06}"
            ))
        })
}

/// Construct an opaque binary parameter value.
#[must_use]
pub fn binary(bytes: impl Into<Vec<u8>>) -> Value {
    Value::Bytes(bytes.into())
}

/// SQL type taxonomy used for column descriptions and parameter classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    Varchar,
    Integer,
    Double,
    Numeric,
    Boolean,
    Date,
    Time,
    Timestamp,
    Binary,
    Json,
    Null,
    Other,
}

impl SqlType {
    /// Classify a declared column type such as `VARCHAR(50)` or `DECIMAL(10,2)`.
    #[must_use]
    pub fn from_declared(decl: &str) -> Self {
        conversion::DeclaredType::parse(decl).sql_type()
    }

    /// Columns of this type are fetched as `Value::Float`.
    #[must_use]
    pub fn is_floating(self) -> bool {
        matches!(self, SqlType::Double | SqlType::Numeric)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SqlType::Varchar => "VARCHAR",
            SqlType::Integer => "INTEGER",
            SqlType::Double => "DOUBLE",
            SqlType::Numeric => "NUMERIC",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Date => "DATE",
            SqlType::Time => "TIME",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Binary => "BINARY",
            SqlType::Json => "JSON",
            SqlType::Null => "NULL",
            SqlType::Other => "OTHER",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The drivers compiled into this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// `SQLite` through rusqlite
    #[cfg(feature = "sqlite")]
    Sqlite,
    /// `PostgreSQL` through tokio-postgres
    #[cfg(feature = "postgres")]
    Postgres,
}

impl DriverKind {
    /// Identifier the driver is registered under.
    #[must_use]
    pub fn identifier(self) -> &'static str {
        match self {
            #[cfg(feature = "sqlite")]
            DriverKind::Sqlite => "sqlite",
            #[cfg(feature = "postgres")]
            DriverKind::Postgres => "postgres",
        }
    }

    /// Connect with this driver through the process-wide registry.
    ///
    /// # Errors
    ///
    /// See [`crate::connect`].
    pub fn connect(
        self,
        args: impl Into<crate::config::ConnectArgs>,
    ) -> Result<crate::connection::Connection, SqlBridgeError> {
        crate::connection::connect(self.identifier(), args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_validate_components() {
        assert_eq!(
            date(2008, 2, 27).unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(2008, 2, 27).unwrap())
        );
        assert!(matches!(
            date(2008, 13, 1),
            Err(SqlBridgeError::BindingError(_))
        ));
        assert!(matches!(time(24, 0, 0), Err(SqlBridgeError::BindingError(_))));
        assert!(matches!(
            timestamp(2010, 2, 30, 14, 31, 59),
            Err(SqlBridgeError::BindingError(_))
        ));
        let ts = timestamp_micros(2009, 9, 10, 14, 15, 22, 123_456).unwrap();
        assert_eq!(
            ts.as_timestamp().unwrap().and_utc().timestamp_subsec_micros(),
            123_456
        );
    }

    #[test]
    fn classification_follows_variant() {
        assert_eq!(Value::Null.sql_type(), SqlType::Null);
        assert_eq!(binary(*b"abcdef").sql_type(), SqlType::Binary);
        assert_eq!(Value::from(1.2).sql_type(), SqlType::Double);
        assert_eq!(Value::from("x").sql_type(), SqlType::Varchar);
        assert_eq!(time(1, 2, 3).unwrap().sql_type(), SqlType::Time);
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(7_i64)), Value::Int(7));
    }

    #[test]
    fn declared_types_follow_affinity() {
        assert_eq!(SqlType::from_declared("VARCHAR(50)"), SqlType::Varchar);
        assert_eq!(SqlType::from_declared("decimal(10,2)"), SqlType::Numeric);
        assert_eq!(SqlType::from_declared("DOUBLE"), SqlType::Double);
        assert_eq!(SqlType::from_declared("BIGINT"), SqlType::Integer);
        assert_eq!(SqlType::from_declared("TIMESTAMP"), SqlType::Timestamp);
        assert_eq!(SqlType::from_declared(""), SqlType::Other);
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn driver_kind_parses_from_cli_and_config() {
        assert_eq!(
            DriverKind::from_str("sqlite", true).unwrap(),
            DriverKind::Sqlite
        );
        let kind: DriverKind = serde_json::from_str(r#""sqlite""#).unwrap();
        assert_eq!(kind.identifier(), "sqlite");
        let conn = kind.connect(":memory:").unwrap();
        assert_eq!(conn.driver(), "sqlite");
    }

    #[test]
    fn accessors_coerce_like_fetch_results() {
        assert_eq!(Value::Int(1).as_bool(), Some(true));
        assert_eq!(Value::Int(2).as_bool(), None);
        assert_eq!(Value::Int(10).as_float(), Some(10.0));
        let ts = Value::Text("2009-09-10 14:15:22.123456".into()).as_timestamp();
        assert!(ts.is_some());
    }
}
