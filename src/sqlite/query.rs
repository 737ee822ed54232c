use rusqlite::Statement;
use rusqlite::types::ValueRef;

use crate::conversion::{
    DeclaredType, format_date, format_time, format_timestamp, parse_date, parse_time,
    parse_timestamp,
};
use crate::error::SqlBridgeError;
use crate::results::{ColumnDescription, ResultSet};
use crate::types::{SqlType, Value};

/// Column descriptions from the declared types of a prepared statement.
///
/// Expression columns have no declared type and are described as `OTHER`; their
/// nullability is unknown.
#[must_use]
pub fn describe(stmt: &Statement<'_>) -> Vec<ColumnDescription> {
    stmt.columns()
        .iter()
        .enumerate()
        .map(|(idx, col)| {
            let Some(declared) = col.decl_type().map(DeclaredType::parse) else {
                return ColumnDescription::new(col.name(), SqlType::Other);
            };
            let null_ok = match stmt.column_metadata(idx) {
                Ok(Some((.., not_null, _, _))) => Some(!not_null),
                _ => None,
            };
            let type_code = declared.sql_type();
            let desc = ColumnDescription::new(col.name(), type_code).with_null_ok(null_ok);
            match type_code {
                SqlType::Double | SqlType::Numeric => {
                    desc.with_precision(declared.size, declared.scale)
                }
                SqlType::Varchar | SqlType::Binary => desc.with_size(declared.size),
                _ => desc,
            }
        })
        .collect()
}

/// Extract column `idx` of `row`, shaped by the column's declared type.
///
/// # Errors
///
/// Returns `SqlBridgeError::SqliteError` if the column index is invalid.
#[allow(clippy::cast_precision_loss)]
pub fn sqlite_extract_value(
    row: &rusqlite::Row<'_>,
    idx: usize,
    type_code: SqlType,
) -> Result<Value, SqlBridgeError> {
    let value = match row.get_ref(idx)? {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) if type_code.is_floating() => Value::Float(i as f64),
        ValueRef::Integer(i) if type_code == SqlType::Boolean => Value::Bool(i != 0),
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) => text_value(&String::from_utf8_lossy(bytes), type_code),
        ValueRef::Blob(bytes) => Value::Bytes(bytes.to_vec()),
    };
    Ok(value)
}

// Stored temporal text is re-rendered canonically when it parses; anything else is kept as is.
fn text_value(text: &str, type_code: SqlType) -> Value {
    let canonical = match type_code {
        SqlType::Date => parse_date(text).map(|d| format_date(&d)),
        SqlType::Time => parse_time(text).map(|t| format_time(&t)),
        SqlType::Timestamp => parse_timestamp(text).map(|ts| format_timestamp(&ts)),
        SqlType::Json => {
            if let Ok(json) = serde_json::from_str(text) {
                return Value::Json(json);
            }
            None
        }
        _ => None,
    };
    Value::Text(canonical.unwrap_or_else(|| text.to_string()))
}

/// Run a row-producing statement whose parameters are already bound and materialize every row.
///
/// # Errors
///
/// Returns `SqlBridgeError::SqliteError` if the query fails or a value cannot be read.
pub fn build_result_set(stmt: &mut Statement<'_>) -> Result<ResultSet, SqlBridgeError> {
    let description = describe(stmt);
    let types: Vec<SqlType> = description.iter().map(|c| c.type_code).collect();
    let mut result_set = ResultSet::with_capacity(description, 10);

    let mut rows = stmt.raw_query();
    while let Some(row) = rows.next()? {
        let row_values = types
            .iter()
            .enumerate()
            .map(|(idx, type_code)| sqlite_extract_value(row, idx, *type_code))
            .collect::<Result<Vec<_>, _>>()?;
        result_set.add_row_values(row_values);
    }
    Ok(result_set)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> rusqlite::Connection {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "create table ACCOUNT (
                ACCOUNT_ID timestamp, ACCOUNT_NO integer, BALANCE decimal(10,2),
                BLOCKING double, VALID boolean, PRODUCT_NAME varchar(50), STUFF blob, META json
            );
            insert into ACCOUNT values
                ('2009-09-10T14:15:22.123456', 18, 12, 1, 1, 'Savings', x'616263', '{\"a\":1}');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn describes_declared_types() {
        let conn = fixture();
        let stmt = conn.prepare("select *, 1 + 1 from ACCOUNT").unwrap();
        let desc = describe(&stmt);
        let types: Vec<SqlType> = desc.iter().map(|c| c.type_code).collect();
        assert_eq!(
            types,
            vec![
                SqlType::Timestamp,
                SqlType::Integer,
                SqlType::Numeric,
                SqlType::Double,
                SqlType::Boolean,
                SqlType::Varchar,
                SqlType::Binary,
                SqlType::Json,
                SqlType::Other,
            ]
        );
        assert_eq!((desc[2].precision, desc[2].scale), (Some(10), Some(2)));
        assert_eq!(desc[5].display_size, Some(50));
        assert_eq!(desc[0].name, "ACCOUNT_ID");
    }

    #[test]
    fn describes_nullability_of_table_columns() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("create table T (A integer not null, B integer)").unwrap();
        let stmt = conn.prepare("select A, B, A + B from T").unwrap();
        let null_ok: Vec<Option<bool>> = describe(&stmt).iter().map(|c| c.null_ok).collect();
        assert_eq!(null_ok, vec![Some(false), Some(true), None]);
    }

    #[test]
    fn values_follow_declared_types() {
        let conn = fixture();
        let mut stmt = conn.prepare("select * from ACCOUNT").unwrap();
        let mut rs = build_result_set(&mut stmt).unwrap();
        let row = rs.next_row().unwrap();
        assert_eq!(
            row.values(),
            [
                Value::Text("2009-09-10 14:15:22.123456".into()),
                Value::Int(18),
                Value::Float(12.0),
                Value::Float(1.0),
                Value::Bool(true),
                Value::Text("Savings".into()),
                Value::Bytes(b"abc".to_vec()),
                Value::Json(serde_json::json!({"a": 1})),
            ]
        );
    }

    #[test]
    fn unparseable_temporal_text_is_kept() {
        assert_eq!(
            text_value("yesterday", SqlType::Date),
            Value::Text("yesterday".into())
        );
        assert_eq!(
            text_value("08:30:00.000", SqlType::Time),
            Value::Text("08:30:00".into())
        );
    }
}
