// Runs against INTEGRATION_TEST_DRIVER / INTEGRATION_TEST_URL, in-memory SQLite by default.
#![cfg(feature = "sqlite")]

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use sql_bridge::prelude::*;
use sql_bridge::test_utils::{
    connect_from_env, driver_from_env, driver_specific_sql, init_tracing, run_sql_file,
};
use sql_bridge::types;

// Tests share one ACCOUNT table when pointed at a server database.
static SERIAL: Mutex<()> = Mutex::new(());

struct Fixture {
    conn: Connection,
    _serial: MutexGuard<'static, ()>,
}

impl Fixture {
    fn new() -> Self {
        init_tracing();
        let serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        let driver = driver_from_env();
        let conn = connect_from_env().expect("connect");
        let data = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data");
        run_sql_file(&conn, driver_specific_sql(&data, "create", &driver)).expect("create.sql");
        run_sql_file(&conn, driver_specific_sql(&data, "insert", &driver)).expect("insert.sql");
        Self {
            conn,
            _serial: serial,
        }
    }

    fn cursor(&self) -> Cursor {
        self.conn.cursor().expect("cursor")
    }

    fn account_count(&self) -> i64 {
        let mut cursor = self.cursor();
        cursor.execute("select count(*) from ACCOUNT", &[]).unwrap();
        cursor.fetchone().unwrap().unwrap()[0].as_int().unwrap()
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        if self.conn.is_closed() {
            return;
        }
        let _ = self.conn.set_autocommit(true);
        if let Ok(mut cursor) = self.conn.cursor() {
            let _ = cursor.execute("drop table ACCOUNT", &[]);
        }
        let _ = self.conn.close();
    }
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn first_seeded() -> Vec<Value> {
    vec![
        text("2009-09-10 14:15:22.123456"),
        Value::Int(18),
        Value::Float(12.4),
        Value::Null,
    ]
}

fn second_seeded() -> Vec<Value> {
    vec![
        text("2009-09-11 14:15:22.123456"),
        Value::Int(19),
        Value::Float(12.9),
        Value::Float(1.0),
    ]
}

const SEEDED_COLUMNS: &str = "select ACCOUNT_ID, ACCOUNT_NO, BALANCE, BLOCKING from ACCOUNT";

#[test]
fn execute_and_fetch_no_data() {
    let fx = Fixture::new();
    let mut cursor = fx.cursor();
    cursor
        .execute("select * from ACCOUNT where ACCOUNT_ID is null", &[])
        .unwrap();
    assert!(cursor.fetchall().unwrap().is_empty());
}

#[test]
fn execute_and_fetch() {
    let fx = Fixture::new();
    let mut cursor = fx.cursor();
    cursor
        .execute(&format!("{SEEDED_COLUMNS} order by ACCOUNT_NO"), &[])
        .unwrap();
    let rows = cursor.fetchall().unwrap();
    assert_eq!(rows, vec![first_seeded(), second_seeded()]);
}

#[test]
fn execute_and_fetch_parameter() {
    let fx = Fixture::new();
    let mut cursor = fx.cursor();
    cursor
        .execute(&format!("{SEEDED_COLUMNS} where ACCOUNT_NO = ?"), &[Value::Int(18)])
        .unwrap();
    assert_eq!(cursor.fetchall().unwrap(), vec![first_seeded()]);
}

#[test]
fn execute_and_fetchone() {
    let fx = Fixture::new();
    let mut cursor = fx.cursor();
    cursor
        .execute(&format!("{SEEDED_COLUMNS} order by ACCOUNT_NO"), &[])
        .unwrap();
    assert_eq!(cursor.fetchone().unwrap().unwrap(), first_seeded());
    cursor.close();
}

#[test]
fn execute_reset_description_without_execute_result() {
    let fx = Fixture::new();
    let mut cursor = fx.cursor();
    cursor.execute("select * from ACCOUNT", &[]).unwrap();
    assert!(cursor.description().is_some());
    cursor.fetchone().unwrap();
    cursor.execute("delete from ACCOUNT", &[]).unwrap();
    assert!(cursor.description().is_none());
    assert_eq!(cursor.rowcount(), 2);
}

#[test]
fn execute_and_fetchone_after_end() {
    let fx = Fixture::new();
    let mut cursor = fx.cursor();
    cursor
        .execute("select * from ACCOUNT where ACCOUNT_NO = ?", &[Value::Int(18)])
        .unwrap();
    assert!(cursor.fetchone().unwrap().is_some());
    assert!(cursor.fetchone().unwrap().is_none());
}

#[test]
fn execute_and_fetchmany() {
    let fx = Fixture::new();
    let mut cursor = fx.cursor();
    cursor
        .execute(&format!("{SEEDED_COLUMNS} order by ACCOUNT_NO"), &[])
        .unwrap();
    assert_eq!(cursor.fetchmany(None).unwrap(), vec![first_seeded()]);
    assert_eq!(cursor.remaining(), 1);
}

#[test]
fn executemany() {
    let fx = Fixture::new();
    let mut cursor = fx.cursor();
    cursor
        .executemany(
            "insert into ACCOUNT (ACCOUNT_ID, ACCOUNT_NO, BALANCE) values (?, ?, ?)",
            [
                vec![text("2009-09-11 14:15:22.123450"), Value::Int(20), Value::Float(13.1)],
                vec![text("2009-09-11 14:15:22.123451"), Value::Int(21), Value::Float(13.2)],
                vec![text("2009-09-11 14:15:22.123452"), Value::Int(22), Value::Float(13.3)],
            ],
        )
        .unwrap();
    assert_eq!(cursor.rowcount(), 3);
    assert_eq!(fx.account_count(), 5);
}

#[test]
fn execute_types() {
    let fx = Fixture::new();
    let mut cursor = fx.cursor();
    let params = vec![
        types::timestamp(2010, 1, 26, 14, 31, 59).unwrap(),
        Value::Int(20),
        Value::Float(1.2),
        Value::Float(10.0),
        Value::Float(3.5),
        types::date(2008, 2, 27).unwrap(),
        Value::Int(1),
        text("Savings account"),
    ];
    cursor
        .execute(
            "insert into ACCOUNT (ACCOUNT_ID, ACCOUNT_NO, BALANCE, BLOCKING, DBL_COL, \
             OPENED_AT, VALID, PRODUCT_NAME) values (?, ?, ?, ?, ?, ?, ?, ?)",
            &params,
        )
        .unwrap();
    cursor
        .execute(
            "select ACCOUNT_ID, ACCOUNT_NO, BALANCE, BLOCKING, DBL_COL, OPENED_AT, VALID, \
             PRODUCT_NAME from ACCOUNT where ACCOUNT_NO = ?",
            &[Value::Int(20)],
        )
        .unwrap();
    let row = cursor.fetchone().unwrap().unwrap();
    cursor.close();
    assert_eq!(
        row,
        vec![
            text("2010-01-26 14:31:59"),
            Value::Int(20),
            Value::Float(1.2),
            Value::Float(10.0),
            Value::Float(3.5),
            text("2008-02-27"),
            Value::Int(1),
            text("Savings account"),
        ]
    );
    assert_eq!(row.get("PRODUCT_NAME"), Some(&text("Savings account")));
}

#[test]
fn execute_type_blob() {
    let fx = Fixture::new();
    let mut cursor = fx.cursor();
    cursor
        .execute(
            "insert into ACCOUNT (ACCOUNT_ID, ACCOUNT_NO, BALANCE, STUFF) values (?, ?, ?, ?)",
            &[
                text("2009-09-11 14:15:22.123450"),
                Value::Int(20),
                Value::Float(13.1),
                types::binary(*b"abcdef"),
            ],
        )
        .unwrap();
    cursor
        .execute("select STUFF from ACCOUNT where ACCOUNT_NO = ?", &[Value::Int(20)])
        .unwrap();
    let row = cursor.fetchone().unwrap().unwrap();
    cursor.close();
    assert_eq!(row[0].as_bytes(), Some(&b"abcdef"[..]));
}

#[test]
fn execute_different_rowcounts() {
    let fx = Fixture::new();
    let mut cursor = fx.cursor();
    let stmt = "insert into ACCOUNT (ACCOUNT_ID, ACCOUNT_NO, BALANCE) values (?, ?, ?)";
    cursor
        .executemany(
            stmt,
            [
                vec![text("2009-09-11 14:15:22.123450"), Value::Int(20), Value::Float(13.1)],
                vec![text("2009-09-11 14:15:22.123452"), Value::Int(22), Value::Float(13.3)],
            ],
        )
        .unwrap();
    assert_eq!(cursor.rowcount(), 2);
    cursor
        .execute(
            stmt,
            &[text("2009-09-11 14:15:22.123451"), Value::Int(21), Value::Float(13.2)],
        )
        .unwrap();
    assert_eq!(cursor.rowcount(), 1);
    cursor.execute("select * from ACCOUNT", &[]).unwrap();
    assert_eq!(cursor.rowcount(), -1);
}

#[test]
fn description_lists_requested_columns_in_order() {
    let fx = Fixture::new();
    let mut cursor = fx.cursor();
    cursor
        .execute("select PRODUCT_NAME, ACCOUNT_NO, BALANCE, OPENED_AT from ACCOUNT", &[])
        .unwrap();
    let description = cursor.description().unwrap();
    let names: Vec<String> = description
        .iter()
        .map(|c| c.name.to_ascii_uppercase())
        .collect();
    assert_eq!(names, ["PRODUCT_NAME", "ACCOUNT_NO", "BALANCE", "OPENED_AT"]);
    let type_codes: Vec<SqlType> = description.iter().map(|c| c.type_code).collect();
    assert_eq!(
        type_codes,
        [SqlType::Varchar, SqlType::Integer, SqlType::Numeric, SqlType::Date]
    );
}

#[test]
fn batch_failure_reports_index_and_keeps_earlier_sets() {
    let fx = Fixture::new();
    let mut cursor = fx.cursor();
    let err = cursor
        .executemany(
            "insert into ACCOUNT (ACCOUNT_ID, ACCOUNT_NO, BALANCE) values (?, ?, ?)",
            [
                vec![text("2009-09-12 10:00:00"), Value::Int(30), Value::Float(1.0)],
                // duplicate primary key
                vec![text("2009-09-10 14:15:22.123456"), Value::Int(31), Value::Float(2.0)],
                vec![text("2009-09-12 10:00:02"), Value::Int(32), Value::Float(3.0)],
            ],
        )
        .unwrap_err();
    assert!(matches!(err, SqlBridgeError::BatchError { index: 1, .. }));
    assert_eq!(cursor.rowcount(), -1);
    assert_eq!(fx.account_count(), 3);
}

#[test]
fn arity_mismatch_is_rejected_before_execution() {
    let fx = Fixture::new();
    let mut cursor = fx.cursor();
    let err = cursor
        .execute("delete from ACCOUNT where ACCOUNT_NO = ?", &[Value::Int(18), Value::Int(19)])
        .unwrap_err();
    assert!(matches!(err, SqlBridgeError::BindingError(_)));
    assert_eq!(fx.account_count(), 2);
}

#[test]
fn rollback_discards_and_commit_keeps() {
    let fx = Fixture::new();
    fx.conn.set_autocommit(false).unwrap();
    assert!(!fx.conn.autocommit().unwrap());
    let mut cursor = fx.cursor();
    let insert = "insert into ACCOUNT (ACCOUNT_ID, ACCOUNT_NO, BALANCE) values (?, ?, ?)";

    cursor
        .execute(insert, &[text("2010-01-01 00:00:00"), Value::Int(40), Value::Float(1.0)])
        .unwrap();
    fx.conn.rollback().unwrap();
    assert_eq!(fx.account_count(), 2);

    cursor
        .execute(insert, &[text("2010-01-02 00:00:00"), Value::Int(41), Value::Float(1.0)])
        .unwrap();
    fx.conn.commit().unwrap();
    fx.conn.set_autocommit(true).unwrap();
    assert_eq!(fx.account_count(), 3);
}

#[test]
fn closing_the_connection_invalidates_cursors() {
    let fx = Fixture::new();
    let mut cursor = fx.cursor();
    cursor.execute("select * from ACCOUNT", &[]).unwrap();
    cursor.execute("drop table ACCOUNT", &[]).unwrap();
    fx.conn.close().unwrap();

    assert!(matches!(cursor.fetchall(), Err(SqlBridgeError::CursorClosed)));
    assert!(matches!(fx.conn.cursor(), Err(SqlBridgeError::ConnectionClosed)));
    fx.conn.close().unwrap();
}
