use std::sync::{Arc, Mutex, PoisonError};

use crate::config::{ConnectArgs, ConnectOptions};
use crate::cursor::Cursor;
use crate::driver::{Session, register_builtin_drivers};
use crate::error::SqlBridgeError;

/// Holds the driver session for a connection and every cursor derived from it.
///
/// `None` once the connection is closed.
pub(crate) struct SessionSlot {
    driver: &'static str,
    session: Mutex<Option<Box<dyn Session>>>,
}

impl SessionSlot {
    /// Run `f` against the open session, or fail with `closed` if there is none.
    pub(crate) fn with_session<R>(
        &self,
        closed: SqlBridgeError,
        f: impl FnOnce(&mut dyn Session) -> Result<R, SqlBridgeError>,
    ) -> Result<R, SqlBridgeError> {
        let mut guard = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_mut() {
            Some(session) => f(session.as_mut()),
            None => Err(closed),
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn take(&self) -> Option<Box<dyn Session>> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// An open database connection.
///
/// Cursors keep only a weak reference to the connection's session: closing or dropping the
/// connection releases the driver handle once and invalidates every cursor.
pub struct Connection {
    slot: Arc<SessionSlot>,
    arraysize: usize,
}

impl Connection {
    pub(crate) fn new(driver: &'static str, session: Box<dyn Session>, options: &ConnectOptions) -> Self {
        Self {
            slot: Arc::new(SessionSlot {
                driver,
                session: Mutex::new(Some(session)),
            }),
            arraysize: options.arraysize,
        }
    }

    /// Identifier of the driver behind this connection.
    #[must_use]
    pub fn driver(&self) -> &'static str {
        self.slot.driver
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        !self.slot.is_open()
    }

    /// Create a new, independent cursor.
    ///
    /// # Errors
    ///
    /// Returns `SqlBridgeError::ConnectionClosed` after [`Connection::close`].
    pub fn cursor(&self) -> Result<Cursor, SqlBridgeError> {
        if self.is_closed() {
            return Err(SqlBridgeError::ConnectionClosed);
        }
        Ok(Cursor::new(Arc::downgrade(&self.slot), self.arraysize))
    }

    /// Commit through the driver.
    ///
    /// # Errors
    ///
    /// Returns `SqlBridgeError::ConnectionClosed` after close, otherwise whatever the driver
    /// reports.
    pub fn commit(&self) -> Result<(), SqlBridgeError> {
        self.slot
            .with_session(SqlBridgeError::ConnectionClosed, |session| session.commit())
    }

    /// Roll back through the driver.
    ///
    /// # Errors
    ///
    /// Returns `SqlBridgeError::ConnectionClosed` after close, otherwise whatever the driver
    /// reports.
    pub fn rollback(&self) -> Result<(), SqlBridgeError> {
        self.slot
            .with_session(SqlBridgeError::ConnectionClosed, |session| session.rollback())
    }

    /// # Errors
    ///
    /// Returns `SqlBridgeError::ConnectionClosed` after close.
    pub fn autocommit(&self) -> Result<bool, SqlBridgeError> {
        self.slot
            .with_session(SqlBridgeError::ConnectionClosed, |session| Ok(session.autocommit()))
    }

    /// # Errors
    ///
    /// Returns `SqlBridgeError::ConnectionClosed` after close, otherwise whatever the implied
    /// commit reports.
    pub fn set_autocommit(&self, enabled: bool) -> Result<(), SqlBridgeError> {
        self.slot.with_session(SqlBridgeError::ConnectionClosed, |session| {
            session.set_autocommit(enabled)
        })
    }

    /// Close the session and invalidate every derived cursor. Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Whatever the driver reports while closing; the connection counts as closed anyway.
    pub fn close(&self) -> Result<(), SqlBridgeError> {
        match self.slot.take() {
            Some(session) => {
                tracing::info!(driver = self.slot.driver, "closing connection");
                session.close()
            }
            None => Ok(()),
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(driver = self.slot.driver, error = %e, "failed to close connection");
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("driver", &self.slot.driver)
            .field("closed", &self.is_closed())
            .field("arraysize", &self.arraysize)
            .finish()
    }
}

/// Connect with the driver registered as `driver` in the process-wide registry.
///
/// Built-in drivers are registered on first use.
///
/// ```rust
/// # #[cfg(feature = "sqlite")] {
/// use sql_bridge::prelude::*;
///
/// let conn = sql_bridge::connect("sqlite", ":memory:")?;
/// let mut cursor = conn.cursor()?;
/// cursor.execute("select ? + 1", &[Value::Int(41)])?;
/// assert_eq!(cursor.fetchone()?.unwrap()[0], Value::Int(42));
/// # }
/// # Ok::<(), sql_bridge::SqlBridgeError>(())
/// ```
///
/// # Errors
///
/// Returns `SqlBridgeError::ConnectionError` if the driver is unknown or the connection fails.
pub fn connect(driver: &str, args: impl Into<ConnectArgs>) -> Result<Connection, SqlBridgeError> {
    register_builtin_drivers().connect(driver, args, &ConnectOptions::default())
}
