//! Driver capability traits and the process-scoped driver registry.
//!
//! A backend implements [`Driver`] (connect) and [`Session`] (prepare, execute, transaction
//! control). Connections pick a driver by identifier at connect time.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use lazy_static::lazy_static;

use crate::binder::{BoundParams, StatementInfo};
use crate::config::{ConnectArgs, ConnectOptions};
use crate::connection::Connection;
use crate::error::SqlBridgeError;
use crate::results::ResultSet;

/// Outcome of running a statement once.
#[derive(Debug)]
pub enum Execution {
    /// The statement produced a row set (possibly empty).
    Rows(ResultSet),
    /// The statement produced no rows; the driver reported this many affected rows.
    Affected(u64),
}

/// A database driver that can open sessions.
pub trait Driver: Send + Sync {
    /// Primary identifier, e.g. `sqlite`.
    fn identifier(&self) -> &'static str;

    /// Alternative identifiers accepted by the registry (matched case-insensitively).
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// Open a session.
    ///
    /// # Errors
    ///
    /// Implementations return `SqlBridgeError::ConnectionError` for any failure.
    fn connect(&self, args: &ConnectArgs) -> Result<Box<dyn Session>, SqlBridgeError>;
}

/// One open driver session. Calls block until the driver answers.
pub trait Session: Send {
    /// Prepare `sql` and report its parameter count and whether it yields rows.
    ///
    /// # Errors
    ///
    /// Driver errors (e.g. syntax errors) are returned unchanged.
    fn prepare(&mut self, sql: &str) -> Result<StatementInfo, SqlBridgeError>;

    /// Run `sql` once with already-bound parameters.
    ///
    /// # Errors
    ///
    /// Driver errors are returned unchanged; values the driver cannot bind produce
    /// `SqlBridgeError::UnsupportedType`.
    fn execute(&mut self, sql: &str, params: &BoundParams<'_>) -> Result<Execution, SqlBridgeError>;

    /// # Errors
    ///
    /// Whatever the driver's commit reports.
    fn commit(&mut self) -> Result<(), SqlBridgeError>;

    /// # Errors
    ///
    /// Whatever the driver's rollback reports.
    fn rollback(&mut self) -> Result<(), SqlBridgeError>;

    fn autocommit(&self) -> bool;

    /// Switching autocommit on commits any open transaction.
    ///
    /// # Errors
    ///
    /// Whatever the implied commit reports.
    fn set_autocommit(&mut self, enabled: bool) -> Result<(), SqlBridgeError>;

    /// Release the driver handle.
    ///
    /// # Errors
    ///
    /// Whatever the driver reports while closing.
    fn close(self: Box<Self>) -> Result<(), SqlBridgeError>;
}

/// Drivers known to this process, keyed by lowercase identifier and alias.
#[derive(Default)]
pub struct DriverRegistry {
    drivers: RwLock<HashMap<String, Arc<dyn Driver>>>,
}

impl DriverRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a driver under its identifier and aliases.
    ///
    /// Idempotent: returns `false` and leaves the registry untouched when the identifier is
    /// already registered.
    pub fn register(&self, driver: Arc<dyn Driver>) -> bool {
        let mut drivers = self.drivers.write().unwrap_or_else(PoisonError::into_inner);
        let primary = driver.identifier().to_ascii_lowercase();
        if drivers.contains_key(&primary) {
            return false;
        }
        for alias in driver.aliases() {
            drivers
                .entry(alias.to_ascii_lowercase())
                .or_insert_with(|| Arc::clone(&driver));
        }
        tracing::debug!(driver = %primary, "registered driver");
        drivers.insert(primary, driver);
        true
    }

    /// Look a driver up by identifier or alias.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<Arc<dyn Driver>> {
        let drivers = self.drivers.read().unwrap_or_else(PoisonError::into_inner);
        drivers.get(&identifier.to_ascii_lowercase()).cloned()
    }

    /// Primary identifiers of every registered driver, sorted.
    #[must_use]
    pub fn identifiers(&self) -> Vec<&'static str> {
        let drivers = self.drivers.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<&'static str> = drivers.values().map(|d| d.identifier()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Open a connection with the driver registered as `driver`.
    ///
    /// # Errors
    ///
    /// Returns `SqlBridgeError::ConnectionError` if no such driver is registered or the driver
    /// fails to connect, and `SqlBridgeError::ConfigError` for invalid options.
    pub fn connect(
        &self,
        driver: &str,
        args: impl Into<ConnectArgs>,
        options: &ConnectOptions,
    ) -> Result<Connection, SqlBridgeError> {
        options.validate()?;
        let args = args.into();
        let found = self.get(driver).ok_or_else(|| {
            SqlBridgeError::ConnectionError(format!(
                "no driver registered as '{driver}' (known: {})",
                self.identifiers().join(", ")
            ))
        })?;

        let mut session = found.connect(&args)?;
        if session.autocommit() != options.autocommit {
            session.set_autocommit(options.autocommit)?;
        }
        tracing::info!(driver = found.identifier(), args = ?args, "connected");
        Ok(Connection::new(found.identifier(), session, options))
    }
}

lazy_static! {
    static ref DRIVERS: DriverRegistry = DriverRegistry::new();
}

/// The process-wide registry.
#[must_use]
pub fn drivers() -> &'static DriverRegistry {
    &DRIVERS
}

/// Register every driver compiled into this build with `registry`. Safe to call repeatedly.
pub fn register_builtin_drivers_into(registry: &DriverRegistry) {
    #[cfg(feature = "sqlite")]
    registry.register(Arc::new(crate::sqlite::SqliteDriver));
    #[cfg(feature = "postgres")]
    registry.register(Arc::new(crate::postgres::PostgresDriver));
    let _ = registry;
}

/// Register the built-in drivers with the process-wide registry and return it.
pub fn register_builtin_drivers() -> &'static DriverRegistry {
    register_builtin_drivers_into(drivers());
    drivers()
}
