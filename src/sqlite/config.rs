use rusqlite::Connection;

use crate::config::{ConnectArgs, strip_jdbc_prefix};
use crate::error::SqlBridgeError;

/// Reduce a connection URL to the path rusqlite opens.
///
/// `jdbc:sqlite::memory:`, `sqlite::memory:` and `:memory:` all name an in-memory database;
/// `sqlite:///tmp/x.db` and `/tmp/x.db` the same file. `file:` URIs pass through unchanged.
#[must_use]
pub fn database_path(url: &str) -> &str {
    let url = strip_jdbc_prefix(url.trim());
    url.strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url)
}

/// Open the database named by `args`.
///
/// Entries after the password are applied as `PRAGMA key = value`, e.g. `foreign_keys=on`.
/// User and password are accepted for call-shape compatibility and ignored.
///
/// # Errors
///
/// Returns `SqlBridgeError::ConnectionError` if the path is empty, the database cannot be
/// opened, or an option is malformed or rejected.
pub fn open(args: &ConnectArgs) -> Result<Connection, SqlBridgeError> {
    let path = database_path(args.url()?);
    if path.is_empty() {
        return Err(SqlBridgeError::ConnectionError(
            "SQLite database path is empty".into(),
        ));
    }

    let conn = Connection::open(path).map_err(|e| {
        SqlBridgeError::ConnectionError(format!("failed to open SQLite database '{path}': {e}"))
    })?;
    if args.user().is_some() {
        tracing::debug!(path, "ignoring credentials for SQLite database");
    }

    for option in args.extra() {
        let (key, value) = parse_pragma(option)?;
        conn.pragma_update(None, key, value).map_err(|e| {
            SqlBridgeError::ConnectionError(format!("failed to apply '{option}': {e}"))
        })?;
    }
    Ok(conn)
}

fn parse_pragma(option: &str) -> Result<(&str, &str), SqlBridgeError> {
    let invalid = || SqlBridgeError::ConnectionError(format!("invalid SQLite option '{option}'"));
    let (key, value) = option.split_once('=').ok_or_else(invalid)?;
    let key = key.trim();
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid());
    }
    Ok((key, value.trim()))
}
