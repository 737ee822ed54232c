use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tokio_postgres::types::{FromSql, Type};
use tokio_postgres::{Row, Statement};

use crate::conversion::{format_date, format_time, format_timestamp};
use crate::error::SqlBridgeError;
use crate::results::{ColumnDescription, ResultSet};
use crate::types::{SqlType, Value};

/// Classify a `PostgreSQL` type.
#[must_use]
pub fn sql_type_of(ty: &Type) -> SqlType {
    match *ty {
        Type::INT2 | Type::INT4 | Type::INT8 | Type::OID => SqlType::Integer,
        Type::FLOAT4 | Type::FLOAT8 => SqlType::Double,
        Type::NUMERIC => SqlType::Numeric,
        Type::BOOL => SqlType::Boolean,
        Type::DATE => SqlType::Date,
        Type::TIME => SqlType::Time,
        Type::TIMESTAMP | Type::TIMESTAMPTZ => SqlType::Timestamp,
        Type::BYTEA => SqlType::Binary,
        Type::JSON | Type::JSONB => SqlType::Json,
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => SqlType::Varchar,
        _ => SqlType::Other,
    }
}

/// Column descriptions of a prepared statement. The wire protocol carries no declared sizes,
/// so only names and type codes are filled in.
#[must_use]
pub fn describe(stmt: &Statement) -> Vec<ColumnDescription> {
    stmt.columns()
        .iter()
        .map(|col| ColumnDescription::new(col.name(), sql_type_of(col.type_())))
        .collect()
}

fn get<'a, T: FromSql<'a>>(
    row: &'a Row,
    idx: usize,
    wrap: impl FnOnce(T) -> Value,
) -> Result<Value, SqlBridgeError> {
    Ok(row.try_get::<_, Option<T>>(idx)?.map_or(Value::Null, wrap))
}

/// Extract column `idx` of `row`.
///
/// Temporal columns come back as canonical text and NUMERIC as `Value::Float`.
///
/// # Errors
///
/// Returns `SqlBridgeError::UnsupportedType` for column types with no text representation
/// and `SqlBridgeError::PostgresError` if decoding fails.
pub fn postgres_extract_value(row: &Row, idx: usize) -> Result<Value, SqlBridgeError> {
    let column = &row.columns()[idx];
    let ty = column.type_();
    match *ty {
        Type::INT2 => get(row, idx, |v: i16| Value::Int(i64::from(v))),
        Type::INT4 => get(row, idx, |v: i32| Value::Int(i64::from(v))),
        Type::INT8 => get(row, idx, Value::Int),
        Type::OID => get(row, idx, |v: u32| Value::Int(i64::from(v))),
        Type::FLOAT4 => get(row, idx, |v: f32| Value::Float(f64::from(v))),
        Type::FLOAT8 => get(row, idx, Value::Float),
        Type::NUMERIC => match row.try_get::<_, Option<Decimal>>(idx)? {
            None => Ok(Value::Null),
            Some(d) => d.to_f64().map(Value::Float).ok_or_else(|| {
                SqlBridgeError::UnsupportedType(format!(
                    "NUMERIC value {d} in column {} does not fit a double",
                    column.name()
                ))
            }),
        },
        Type::BOOL => get(row, idx, Value::Bool),
        Type::DATE => get(row, idx, |v: NaiveDate| Value::Text(format_date(&v))),
        Type::TIME => get(row, idx, |v: NaiveTime| Value::Text(format_time(&v))),
        Type::TIMESTAMP => get(row, idx, |v: NaiveDateTime| Value::Text(format_timestamp(&v))),
        Type::TIMESTAMPTZ => get(row, idx, |v: DateTime<Utc>| {
            Value::Text(format_timestamp(&v.naive_utc()))
        }),
        Type::BYTEA => get(row, idx, Value::Bytes),
        Type::JSON | Type::JSONB => get(row, idx, Value::Json),
        _ if <String as FromSql<'_>>::accepts(ty) => get(row, idx, Value::Text),
        _ => Err(SqlBridgeError::UnsupportedType(format!(
            "column {} has PostgreSQL type {ty}",
            column.name()
        ))),
    }
}

/// Materialize the rows of a query.
///
/// # Errors
///
/// See [`postgres_extract_value`].
pub fn build_result_set(stmt: &Statement, rows: &[Row]) -> Result<ResultSet, SqlBridgeError> {
    let mut result_set = ResultSet::with_capacity(describe(stmt), rows.len());
    for row in rows {
        let row_values = (0..row.len())
            .map(|idx| postgres_extract_value(row, idx))
            .collect::<Result<Vec<_>, _>>()?;
        result_set.add_row_values(row_values);
    }
    Ok(result_set)
}
