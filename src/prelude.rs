//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::binder::{BoundParam, BoundParams, StatementInfo};
pub use crate::config::{ConnectArgs, ConnectOptions, ConnectionConfig};
pub use crate::connection::{Connection, connect};
pub use crate::cursor::Cursor;
pub use crate::driver::{
    Driver, DriverRegistry, Execution, Session, drivers, register_builtin_drivers,
};
pub use crate::error::SqlBridgeError;
pub use crate::results::{ColumnDescription, ResultSet, Row};
pub use crate::translation::{PlaceholderStyle, split_statements, translate_placeholders};
pub use crate::types::{DriverKind, SqlType, Value};

#[cfg(feature = "postgres")]
pub use crate::postgres::PostgresDriver;
#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteDriver;
