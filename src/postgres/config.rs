use std::time::Duration;

use tokio_postgres::Config;

use crate::config::{ConnectArgs, strip_jdbc_prefix};
use crate::error::SqlBridgeError;

/// Build a `tokio_postgres::Config` from connection arguments.
///
/// The URL may be `postgres://`, `postgresql://`, JDBC-prefixed, or a `key=value` string.
/// A non-empty user and the password from the argument list override the URL's. Extra entries
/// are `key=value` options: `dbname`, `application_name`, `options` and `connect_timeout`
/// (seconds).
///
/// # Errors
///
/// Returns `SqlBridgeError::ConnectionError` for an unparseable URL, a URL without a host,
/// or an unknown or malformed option.
pub fn pg_config(args: &ConnectArgs) -> Result<Config, SqlBridgeError> {
    let url = strip_jdbc_prefix(args.url()?.trim());
    let mut config: Config = url.parse().map_err(|e| {
        SqlBridgeError::ConnectionError(format!("invalid PostgreSQL connection string: {e}"))
    })?;

    if let Some(user) = args.user().filter(|u| !u.is_empty()) {
        config.user(user);
    }
    if let Some(password) = args.password() {
        config.password(password);
    }

    for option in args.extra() {
        let invalid =
            || SqlBridgeError::ConnectionError(format!("invalid PostgreSQL option '{option}'"));
        let (key, value) = option.split_once('=').ok_or_else(invalid)?;
        let value = value.trim();
        match key.trim() {
            "dbname" => {
                config.dbname(value);
            }
            "application_name" => {
                config.application_name(value);
            }
            "options" => {
                config.options(value);
            }
            "connect_timeout" => {
                let secs: u64 = value.parse().map_err(|_| invalid())?;
                config.connect_timeout(Duration::from_secs(secs));
            }
            _ => return Err(invalid()),
        }
    }

    if config.get_hosts().is_empty() {
        return Err(SqlBridgeError::ConnectionError(
            "PostgreSQL connection string names no host".into(),
        ));
    }
    Ok(config)
}
