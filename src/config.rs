use std::fmt;

use serde::{Deserialize, Serialize};

use crate::connection::Connection;
use crate::driver::register_builtin_drivers;
use crate::error::SqlBridgeError;

/// Arguments handed to a driver's connect call.
///
/// Either a single connection string, or an ordered list `[url, user, password, ...]`;
/// entries past the password are driver-specific `key=value` options.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConnectArgs {
    Url(String),
    List(Vec<String>),
}

impl ConnectArgs {
    /// The connection URL or path.
    ///
    /// # Errors
    ///
    /// Returns `SqlBridgeError::ConnectionError` for an empty argument list.
    pub fn url(&self) -> Result<&str, SqlBridgeError> {
        match self {
            ConnectArgs::Url(url) => Ok(url),
            ConnectArgs::List(items) => items.first().map(String::as_str).ok_or_else(|| {
                SqlBridgeError::ConnectionError("connection arguments are empty".into())
            }),
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.list_item(1)
    }

    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.list_item(2)
    }

    /// Driver-specific options following the password.
    #[must_use]
    pub fn extra(&self) -> &[String] {
        match self {
            ConnectArgs::List(items) if items.len() > 3 => &items[3..],
            _ => &[],
        }
    }

    fn list_item(&self, idx: usize) -> Option<&str> {
        match self {
            ConnectArgs::List(items) => items.get(idx).map(String::as_str),
            ConnectArgs::Url(_) => None,
        }
    }
}

// Never print the password, these end up in logs.
impl fmt::Debug for ConnectArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectArgs::Url(url) => f.debug_tuple("Url").field(url).finish(),
            ConnectArgs::List(items) => {
                let redacted: Vec<&str> = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| if i == 2 { "***" } else { item.as_str() })
                    .collect();
                f.debug_tuple("List").field(&redacted).finish()
            }
        }
    }
}

impl From<&str> for ConnectArgs {
    fn from(url: &str) -> Self {
        ConnectArgs::Url(url.to_string())
    }
}

impl From<String> for ConnectArgs {
    fn from(url: String) -> Self {
        ConnectArgs::Url(url)
    }
}

impl From<Vec<String>> for ConnectArgs {
    fn from(items: Vec<String>) -> Self {
        ConnectArgs::List(items)
    }
}

impl From<Vec<&str>> for ConnectArgs {
    fn from(items: Vec<&str>) -> Self {
        ConnectArgs::List(items.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ConnectArgs {
    fn from(items: [&str; N]) -> Self {
        ConnectArgs::List(items.iter().map(|s| (*s).to_string()).collect())
    }
}

/// Strip a leading `jdbc:` so JDBC-style URLs can be reused unchanged.
#[must_use]
pub fn strip_jdbc_prefix(url: &str) -> &str {
    url.strip_prefix("jdbc:").unwrap_or(url)
}

/// Options applied to a connection right after the driver hands back its session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub autocommit: bool,
    pub arraysize: usize,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            autocommit: true,
            arraysize: 1,
        }
    }
}

impl ConnectOptions {
    #[must_use]
    pub fn builder(driver: impl Into<String>, args: impl Into<ConnectArgs>) -> ConnectOptionsBuilder {
        ConnectOptionsBuilder::new(driver, args)
    }
}

/// Fluent builder for a connection.
///
/// ```rust,no_run
/// use sql_bridge::config::ConnectOptions;
///
/// let conn = ConnectOptions::builder("sqlite", "jdbc:sqlite::memory:")
///     .autocommit(false)
///     .arraysize(50)
///     .connect()?;
/// # Ok::<(), sql_bridge::SqlBridgeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConnectOptionsBuilder {
    driver: String,
    args: ConnectArgs,
    opts: ConnectOptions,
}

impl ConnectOptionsBuilder {
    #[must_use]
    pub fn new(driver: impl Into<String>, args: impl Into<ConnectArgs>) -> Self {
        Self {
            driver: driver.into(),
            args: args.into(),
            opts: ConnectOptions::default(),
        }
    }

    #[must_use]
    pub fn autocommit(mut self, autocommit: bool) -> Self {
        self.opts.autocommit = autocommit;
        self
    }

    #[must_use]
    pub fn arraysize(mut self, arraysize: usize) -> Self {
        self.opts.arraysize = arraysize;
        self
    }

    #[must_use]
    pub fn finish(self) -> ConnectOptions {
        self.opts
    }

    /// Connect through the process-wide driver registry.
    ///
    /// # Errors
    ///
    /// Returns `SqlBridgeError::ConfigError` for invalid options and
    /// `SqlBridgeError::ConnectionError` if the driver is unknown or refuses the connection.
    pub fn connect(self) -> Result<Connection, SqlBridgeError> {
        register_builtin_drivers().connect(&self.driver, self.args, &self.opts)
    }
}

fn default_autocommit() -> bool {
    true
}

fn default_arraysize() -> usize {
    1
}

/// Serializable connection settings, e.g. loaded from a JSON file.
///
/// ```rust
/// use sql_bridge::config::{ConnectArgs, ConnectionConfig};
///
/// let cfg = ConnectionConfig::from_json(
///     r#"{ "driver": "postgres", "args": ["postgres://localhost/test", "sa", ""] }"#,
/// )?;
/// assert_eq!(cfg.args.user(), Some("sa"));
/// assert!(cfg.autocommit);
/// # Ok::<(), sql_bridge::SqlBridgeError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub driver: String,
    pub args: ConnectArgs,
    #[serde(default = "default_autocommit")]
    pub autocommit: bool,
    #[serde(default = "default_arraysize")]
    pub arraysize: usize,
}

impl ConnectionConfig {
    /// Parse settings from JSON.
    ///
    /// # Errors
    ///
    /// Returns `SqlBridgeError::ConfigError` if the JSON is malformed or invalid.
    pub fn from_json(json: &str) -> Result<Self, SqlBridgeError> {
        let cfg: ConnectionConfig = serde_json::from_str(json)
            .map_err(|e| SqlBridgeError::ConfigError(format!("invalid connection config: {e}")))?;
        cfg.options().validate()?;
        Ok(cfg)
    }

    #[must_use]
    pub fn options(&self) -> ConnectOptions {
        ConnectOptions {
            autocommit: self.autocommit,
            arraysize: self.arraysize,
        }
    }

    /// Connect through the process-wide driver registry.
    ///
    /// # Errors
    ///
    /// See [`ConnectOptionsBuilder::connect`].
    pub fn connect(&self) -> Result<Connection, SqlBridgeError> {
        register_builtin_drivers().connect(&self.driver, self.args.clone(), &self.options())
    }
}

impl ConnectOptions {
    /// # Errors
    ///
    /// Returns `SqlBridgeError::ConfigError` when `arraysize` is zero.
    pub fn validate(&self) -> Result<(), SqlBridgeError> {
        if self.arraysize == 0 {
            return Err(SqlBridgeError::ConfigError(
                "arraysize must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
