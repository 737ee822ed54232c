// PostgreSQL driver backed by tokio-postgres, driven synchronously.
//
// - config: connection arguments to `tokio_postgres::Config`
// - params: type-directed parameter encoding
// - query: column descriptions and result extraction
// - connection: the `Session` implementation

pub mod config;
pub mod connection;
pub mod params;
pub mod query;

use crate::config::ConnectArgs;
use crate::driver::{Driver, Session};
use crate::error::SqlBridgeError;

pub use config::pg_config;
pub use connection::PostgresSession;
pub use params::{PgParam, UnsupportedBinding};
pub use query::{build_result_set, describe, postgres_extract_value, sql_type_of};

/// Registered as `postgres`, also reachable as `postgresql` and `org.postgresql.Driver`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDriver;

impl Driver for PostgresDriver {
    fn identifier(&self) -> &'static str {
        "postgres"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["postgresql", "org.postgresql.Driver"]
    }

    fn connect(&self, args: &ConnectArgs) -> Result<Box<dyn Session>, SqlBridgeError> {
        let config = pg_config(args)?;
        Ok(Box::new(PostgresSession::connect(&config)?))
    }
}
