// SQLite driver backed by rusqlite.
//
// - config: path normalization and opening the database
// - params: binding `Value`s through rusqlite's `ToSql`
// - query: column descriptions and result extraction
// - connection: the `Session` implementation

pub mod config;
pub mod connection;
pub mod params;
pub mod query;

use crate::config::ConnectArgs;
use crate::driver::{Driver, Session};
use crate::error::SqlBridgeError;

pub use config::{database_path, open};
pub use connection::SqliteSession;
pub use params::{SqliteParam, bind_params};
pub use query::{build_result_set, describe, sqlite_extract_value};

/// Registered as `sqlite`, also reachable as `sqlite3`, `rusqlite` and `org.sqlite.JDBC`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

impl Driver for SqliteDriver {
    fn identifier(&self) -> &'static str {
        "sqlite"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["sqlite3", "rusqlite", "org.sqlite.JDBC"]
    }

    fn connect(&self, args: &ConnectArgs) -> Result<Box<dyn Session>, SqlBridgeError> {
        let conn = open(args)?;
        Ok(Box::new(SqliteSession::new(conn)))
    }
}
