#![cfg(feature = "test-utils-postgres")]

use std::path::PathBuf;

use sql_bridge::prelude::*;
use sql_bridge::test_utils::postgres::{setup_postgres_embedded, stop_postgres_embedded};
use sql_bridge::test_utils::{driver_specific_sql, init_tracing, run_sql_file};
use sql_bridge::types;

fn seed(conn: &Connection) -> Result<(), SqlBridgeError> {
    let data = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data");
    run_sql_file(conn, driver_specific_sql(&data, "create", "postgres"))?;
    run_sql_file(conn, driver_specific_sql(&data, "insert", "postgres"))?;
    Ok(())
}

// One server for the whole scenario; the steps share the ACCOUNT table.
#[test]
fn postgres_cursor_scenario() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let pg = setup_postgres_embedded("bridge_test")?;
    let conn = pg.connect()?;
    assert_eq!(conn.driver(), "postgres");
    seed(&conn)?;
    let mut cursor = conn.cursor()?;

    cursor.execute(
        "select ACCOUNT_ID, ACCOUNT_NO, BALANCE, BLOCKING from ACCOUNT order by ACCOUNT_NO",
        &[],
    )?;
    assert_eq!(
        cursor.fetchall()?,
        vec![
            vec![
                Value::Text("2009-09-10 14:15:22.123456".into()),
                Value::Int(18),
                Value::Float(12.4),
                Value::Null,
            ],
            vec![
                Value::Text("2009-09-11 14:15:22.123456".into()),
                Value::Int(19),
                Value::Float(12.9),
                Value::Float(1.0),
            ],
        ]
    );
    let names: Vec<&str> = cursor
        .description()
        .map(|d| d.iter().map(|c| c.name.as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, ["account_id", "account_no", "balance", "blocking"]);

    // '?' inside a literal is not a placeholder
    cursor.execute(
        "select count(*) from ACCOUNT where ACCOUNT_NO = ? and PRODUCT_NAME is distinct from '?'",
        &[Value::Int(18)],
    )?;
    assert_eq!(cursor.fetchone()?.map(|r| r[0].clone()), Some(Value::Int(1)));

    cursor.execute(
        "insert into ACCOUNT (ACCOUNT_ID, ACCOUNT_NO, BALANCE, OPENED_AT, STUFF) values (?, ?, ?, ?, ?)",
        &[
            types::timestamp_micros(2010, 1, 26, 14, 31, 59, 500).unwrap(),
            Value::Int(20),
            Value::Text("13.10".into()),
            types::date(2008, 2, 27).unwrap(),
            types::binary(*b"abcdef"),
        ],
    )?;
    assert_eq!(cursor.rowcount(), 1);
    cursor.execute(
        "select ACCOUNT_ID, BALANCE, OPENED_AT, STUFF from ACCOUNT where ACCOUNT_NO = ?",
        &[Value::Int(20)],
    )?;
    let row = cursor.fetchone()?.expect("inserted row");
    assert_eq!(
        row,
        vec![
            Value::Text("2010-01-26 14:31:59.000500".into()),
            Value::Float(13.1),
            Value::Text("2008-02-27".into()),
            Value::Bytes(b"abcdef".to_vec()),
        ]
    );

    let err = cursor
        .execute(
            "update ACCOUNT set VALID = ? where ACCOUNT_NO = 20",
            &[types::binary(*b"abcdef")],
        )
        .unwrap_err();
    assert!(matches!(err, SqlBridgeError::UnsupportedType(_)), "{err:?}");

    conn.set_autocommit(false)?;
    cursor.executemany(
        "update ACCOUNT set VALID = ?1 where ACCOUNT_NO = ?2",
        [[Value::Int(1), Value::Int(18)], [Value::Int(1), Value::Int(19)]],
    )?;
    assert_eq!(cursor.rowcount(), 2);
    conn.rollback()?;
    cursor.execute("select count(*) from ACCOUNT where VALID = 1", &[])?;
    assert_eq!(cursor.fetchone()?.map(|r| r[0].clone()), Some(Value::Int(0)));
    conn.set_autocommit(true)?;

    cursor.execute("drop table ACCOUNT", &[])?;
    conn.close()?;
    assert!(matches!(cursor.fetchone(), Err(SqlBridgeError::CursorClosed)));

    stop_postgres_embedded(pg);
    Ok(())
}

#[test]
fn unreachable_server_is_a_connection_error() {
    let err = sql_bridge::connect(
        "org.postgresql.Driver",
        ["jdbc:postgresql://127.0.0.1:1/none", "sa", "", "connect_timeout=1"],
    )
    .unwrap_err();
    assert!(matches!(err, SqlBridgeError::ConnectionError(_)));
}
