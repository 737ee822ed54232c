use std::path::{Path, PathBuf};

use crate::config::ConnectArgs;
use crate::connection::{Connection, connect};
use crate::error::SqlBridgeError;
use crate::translation::split_statements;

/// Driver used by the integration suite.
pub const DRIVER_ENV: &str = "INTEGRATION_TEST_DRIVER";
pub const URL_ENV: &str = "INTEGRATION_TEST_URL";
pub const USER_ENV: &str = "INTEGRATION_TEST_USER";
pub const PASSWORD_ENV: &str = "INTEGRATION_TEST_PASSWORD";

/// Execute every statement of `sql` in order with one cursor.
///
/// Returns the number of statements run.
///
/// # Errors
///
/// Returns the first statement's error; earlier statements stay applied.
pub fn run_sql_script(conn: &Connection, sql: &str) -> Result<usize, SqlBridgeError> {
    let statements = split_statements(sql);
    let mut cursor = conn.cursor()?;
    for statement in &statements {
        cursor.execute(statement, &[])?;
    }
    cursor.close();
    tracing::debug!(statements = statements.len(), "ran SQL script");
    Ok(statements.len())
}

/// Read `path` and run it with [`run_sql_script`].
///
/// # Errors
///
/// Returns `SqlBridgeError::ConfigError` if the file cannot be read, otherwise see
/// [`run_sql_script`].
pub fn run_sql_file(conn: &Connection, path: impl AsRef<Path>) -> Result<usize, SqlBridgeError> {
    let path = path.as_ref();
    let sql = std::fs::read_to_string(path).map_err(|e| {
        SqlBridgeError::ConfigError(format!("cannot read SQL file {}: {e}", path.display()))
    })?;
    run_sql_script(conn, &sql)
}

/// `<dir>/<name>_<driver>.sql` if it exists, else `<dir>/<name>.sql`.
#[must_use]
pub fn driver_specific_sql(dir: impl AsRef<Path>, name: &str, driver: &str) -> PathBuf {
    let dir = dir.as_ref();
    let specific = dir.join(format!("{name}_{}.sql", driver.to_ascii_lowercase()));
    if specific.is_file() {
        specific
    } else {
        dir.join(format!("{name}.sql"))
    }
}

/// Driver named by `INTEGRATION_TEST_DRIVER`, `sqlite` when unset.
#[must_use]
pub fn driver_from_env() -> String {
    std::env::var(DRIVER_ENV)
        .ok()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| "sqlite".to_string())
}

/// Connection arguments from `INTEGRATION_TEST_URL` plus optional user and password.
///
/// Without a URL the in-memory `SQLite` database is used.
///
/// # Errors
///
/// Returns `SqlBridgeError::ConfigError` if a URL is required for a non-`SQLite` driver.
pub fn connect_args_from_env(driver: &str) -> Result<ConnectArgs, SqlBridgeError> {
    let url = match std::env::var(URL_ENV) {
        Ok(url) => url,
        Err(_) if driver.to_ascii_lowercase().starts_with("sqlite") => ":memory:".to_string(),
        Err(_) => {
            return Err(SqlBridgeError::ConfigError(format!(
                "{URL_ENV} must be set to test driver '{driver}'"
            )));
        }
    };
    let user = std::env::var(USER_ENV).ok();
    let password = std::env::var(PASSWORD_ENV).ok();
    Ok(match (user, password) {
        (None, None) => ConnectArgs::Url(url),
        (user, password) => {
            ConnectArgs::List(vec![url, user.unwrap_or_default(), password.unwrap_or_default()])
        }
    })
}

/// Connect with [`driver_from_env`] and [`connect_args_from_env`].
///
/// # Errors
///
/// See [`connect_args_from_env`] and [`connect`].
pub fn connect_from_env() -> Result<Connection, SqlBridgeError> {
    let driver = driver_from_env();
    let args = connect_args_from_env(&driver)?;
    connect(&driver, args)
}

/// Route `tracing` output to the test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_target(false)
        .try_init();
}
