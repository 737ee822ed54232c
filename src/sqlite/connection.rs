use rusqlite::Connection;

use super::params::bind_params;
use super::query::build_result_set;
use crate::binder::{BoundParams, StatementInfo};
use crate::driver::{Execution, Session};
use crate::error::SqlBridgeError;

/// One rusqlite connection.
///
/// rusqlite runs in autocommit mode unless a transaction is open. With autocommit switched off
/// the session issues `BEGIN` before the next statement and leaves the transaction open until
/// commit or rollback.
pub struct SqliteSession {
    conn: Connection,
    autocommit: bool,
}

impl SqliteSession {
    #[must_use]
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            autocommit: true,
        }
    }

    fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    fn finish_transaction(&mut self, sql: &str) -> Result<(), SqlBridgeError> {
        if self.in_transaction() {
            tracing::debug!(sql, "ending SQLite transaction");
            self.conn.execute_batch(sql)?;
        }
        Ok(())
    }
}

impl Session for SqliteSession {
    fn prepare(&mut self, sql: &str) -> Result<StatementInfo, SqlBridgeError> {
        let stmt = self.conn.prepare_cached(sql)?;
        Ok(StatementInfo {
            parameter_count: stmt.parameter_count(),
            produces_rows: stmt.column_count() > 0,
        })
    }

    fn execute(&mut self, sql: &str, params: &BoundParams<'_>) -> Result<Execution, SqlBridgeError> {
        if !self.autocommit && !self.in_transaction() {
            self.conn.execute_batch("BEGIN")?;
        }

        let mut stmt = self.conn.prepare_cached(sql)?;
        bind_params(&mut stmt, params)?;
        if stmt.column_count() > 0 {
            return build_result_set(&mut stmt).map(Execution::Rows);
        }
        // sqlite3_changes() is left untouched by DDL, so it may still hold the previous DML count
        let before = self.conn.total_changes();
        let affected = stmt.raw_execute()?;
        if self.conn.total_changes() == before {
            return Ok(Execution::Affected(0));
        }
        Ok(Execution::Affected(u64::try_from(affected).unwrap_or(u64::MAX)))
    }

    fn commit(&mut self) -> Result<(), SqlBridgeError> {
        self.finish_transaction("COMMIT")
    }

    fn rollback(&mut self) -> Result<(), SqlBridgeError> {
        self.finish_transaction("ROLLBACK")
    }

    fn autocommit(&self) -> bool {
        self.autocommit
    }

    fn set_autocommit(&mut self, enabled: bool) -> Result<(), SqlBridgeError> {
        if enabled && !self.autocommit {
            self.finish_transaction("COMMIT")?;
        }
        self.autocommit = enabled;
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), SqlBridgeError> {
        self.conn.close().map_err(|(_, e)| SqlBridgeError::SqliteError(e))
    }
}
