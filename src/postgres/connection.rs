use std::error::Error as _;

use tokio::runtime::{Builder, Runtime};
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Config, NoTls, Statement};

use super::params::{PgParam, UnsupportedBinding};
use super::query::build_result_set;
use crate::binder::{BoundParams, StatementInfo};
use crate::driver::{Execution, Session};
use crate::error::SqlBridgeError;
use crate::translation::{PlaceholderStyle, translate_placeholders};

/// A blocking session over a `tokio_postgres::Client`.
///
/// The session owns a current-thread runtime; every call drives the client with `block_on`,
/// which also polls the spawned connection task. It must not be used from inside another
/// tokio runtime.
pub struct PostgresSession {
    runtime: Runtime,
    client: Client,
    prepared: Option<(String, Statement)>,
    autocommit: bool,
    in_transaction: bool,
}

impl PostgresSession {
    /// # Errors
    ///
    /// Returns `SqlBridgeError::ConnectionError` if the runtime cannot be built or the server
    /// refuses the connection.
    pub fn connect(config: &Config) -> Result<Self, SqlBridgeError> {
        let runtime = Builder::new_current_thread().enable_all().build().map_err(|e| {
            SqlBridgeError::ConnectionError(format!("failed to start PostgreSQL runtime: {e}"))
        })?;
        let (client, connection) = runtime.block_on(config.connect(NoTls)).map_err(|e| {
            SqlBridgeError::ConnectionError(format!("failed to connect to PostgreSQL: {e}"))
        })?;
        runtime.spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "PostgreSQL connection task failed");
            }
        });

        Ok(Self {
            runtime,
            client,
            prepared: None,
            autocommit: true,
            in_transaction: false,
        })
    }

    // Only the most recent statement is kept; a cursor prepares and then executes the same SQL.
    fn statement(&mut self, sql: &str) -> Result<Statement, SqlBridgeError> {
        if let Some((cached, stmt)) = &self.prepared {
            if cached == sql {
                return Ok(stmt.clone());
            }
        }
        let translated = translate_placeholders(sql, PlaceholderStyle::Dollar);
        let stmt = self.runtime.block_on(self.client.prepare(&translated))?;
        self.prepared = Some((sql.to_string(), stmt.clone()));
        Ok(stmt)
    }

    fn batch(&mut self, sql: &str) -> Result<(), SqlBridgeError> {
        self.runtime.block_on(self.client.batch_execute(sql))?;
        Ok(())
    }

    fn end_transaction(&mut self, sql: &str) -> Result<(), SqlBridgeError> {
        tracing::debug!(sql, in_transaction = self.in_transaction, "ending PostgreSQL transaction");
        self.batch(sql)?;
        self.in_transaction = false;
        Ok(())
    }
}

fn map_pg_error(err: tokio_postgres::Error) -> SqlBridgeError {
    match err
        .source()
        .and_then(|source| source.downcast_ref::<UnsupportedBinding>())
    {
        Some(unsupported) => SqlBridgeError::UnsupportedType(unsupported.to_string()),
        None => SqlBridgeError::PostgresError(err),
    }
}

impl Session for PostgresSession {
    fn prepare(&mut self, sql: &str) -> Result<StatementInfo, SqlBridgeError> {
        let stmt = self.statement(sql)?;
        Ok(StatementInfo {
            parameter_count: stmt.params().len(),
            produces_rows: !stmt.columns().is_empty(),
        })
    }

    fn execute(&mut self, sql: &str, params: &BoundParams<'_>) -> Result<Execution, SqlBridgeError> {
        let stmt = self.statement(sql)?;
        if !self.autocommit && !self.in_transaction {
            self.batch("BEGIN")?;
            self.in_transaction = true;
        }

        let values: Vec<PgParam<'_>> = params.iter().copied().map(PgParam).collect();
        let refs: Vec<&(dyn ToSql + Sync)> =
            values.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

        if stmt.columns().is_empty() {
            let affected = self
                .runtime
                .block_on(self.client.execute(&stmt, &refs))
                .map_err(map_pg_error)?;
            Ok(Execution::Affected(affected))
        } else {
            let rows = self
                .runtime
                .block_on(self.client.query(&stmt, &refs))
                .map_err(map_pg_error)?;
            build_result_set(&stmt, &rows).map(Execution::Rows)
        }
    }

    fn commit(&mut self) -> Result<(), SqlBridgeError> {
        self.end_transaction("COMMIT")
    }

    fn rollback(&mut self) -> Result<(), SqlBridgeError> {
        self.end_transaction("ROLLBACK")
    }

    fn autocommit(&self) -> bool {
        self.autocommit
    }

    fn set_autocommit(&mut self, enabled: bool) -> Result<(), SqlBridgeError> {
        if enabled && self.in_transaction {
            self.end_transaction("COMMIT")?;
        }
        self.autocommit = enabled;
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), SqlBridgeError> {
        let PostgresSession {
            runtime, client, ..
        } = *self;
        drop(client);
        runtime.shutdown_background();
        Ok(())
    }
}
