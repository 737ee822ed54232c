use rusqlite::types::{ToSqlOutput, Value as SqliteValue, ValueRef};
use rusqlite::{Statement, ToSql};

use crate::binder::BoundParams;
use crate::conversion::{format_date, format_time, format_timestamp};
use crate::error::SqlBridgeError;
use crate::types::Value;

/// Binds one [`Value`] through rusqlite.
///
/// Text and blobs are borrowed; temporal values are stored as canonical text and booleans as
/// 0/1, matching how `SQLite` itself represents them.
#[derive(Debug, Clone, Copy)]
pub struct SqliteParam<'a>(pub &'a Value);

impl ToSql for SqliteParam<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let out = match self.0 {
            Value::Null => ToSqlOutput::Owned(SqliteValue::Null),
            Value::Int(i) => ToSqlOutput::Owned(SqliteValue::Integer(*i)),
            Value::Float(f) => ToSqlOutput::Owned(SqliteValue::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Bool(b) => ToSqlOutput::Owned(SqliteValue::Integer(i64::from(*b))),
            Value::Date(d) => ToSqlOutput::Owned(SqliteValue::Text(format_date(d))),
            Value::Time(t) => ToSqlOutput::Owned(SqliteValue::Text(format_time(t))),
            Value::Timestamp(ts) => ToSqlOutput::Owned(SqliteValue::Text(format_timestamp(ts))),
            Value::Json(j) => ToSqlOutput::Owned(SqliteValue::Text(j.to_string())),
            Value::Bytes(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        };
        Ok(out)
    }
}

/// Attach every bound value to its placeholder position on `stmt`.
///
/// # Errors
///
/// Returns `SqlBridgeError::SqliteError` if a position is out of range for the statement.
pub fn bind_params(stmt: &mut Statement<'_>, params: &BoundParams<'_>) -> Result<(), SqlBridgeError> {
    for param in params {
        stmt.raw_bind_parameter(param.position, SqliteParam(param.value))?;
    }
    Ok(())
}
