//! Cursor-style database API over pluggable drivers.
//!
//! Connect through a registered driver, create cursors, execute statements with positional
//! `?` parameters and fetch typed rows. `SQLite` (rusqlite) is built in by default;
//! `PostgreSQL` (tokio-postgres) is behind the `postgres` feature.
//!
//! ```rust
//! # #[cfg(feature = "sqlite")] {
//! use sql_bridge::prelude::*;
//!
//! let conn = sql_bridge::connect("sqlite", "jdbc:sqlite::memory:")?;
//! let mut cursor = conn.cursor()?;
//! cursor.execute("create table ACCOUNT (ACCOUNT_NO integer, BALANCE decimal(10,2))", &[])?;
//! cursor.execute("insert into ACCOUNT values (?, ?)", &[Value::Int(18), Value::Float(12.4)])?;
//! assert_eq!(cursor.rowcount(), 1);
//!
//! cursor.execute("select BALANCE from ACCOUNT", &[])?;
//! assert_eq!(cursor.description().unwrap()[0].type_code, SqlType::Numeric);
//! assert_eq!(cursor.fetchone()?.unwrap()[0], Value::Float(12.4));
//! conn.close()?;
//! # }
//! # Ok::<(), sql_bridge::SqlBridgeError>(())
//! ```

pub mod binder;
pub mod config;
pub mod connection;
pub mod conversion;
pub mod cursor;
pub mod driver;
pub mod error;
pub mod prelude;
pub mod results;
pub mod translation;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use config::{ConnectArgs, ConnectOptions, ConnectionConfig};
pub use connection::{Connection, connect};
pub use cursor::Cursor;
pub use driver::{Driver, DriverRegistry, Execution, Session, drivers, register_builtin_drivers};
pub use error::SqlBridgeError;
pub use results::{ColumnDescription, ResultSet, Row};
pub use types::{DriverKind, SqlType, Value};
