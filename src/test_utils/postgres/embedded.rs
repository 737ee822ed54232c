use postgresql_embedded::PostgreSQL;

use super::super::SHARED_RUNTIME;
use crate::config::ConnectArgs;
use crate::connection::Connection;
use crate::driver::register_builtin_drivers;

/// Represents a running embedded `PostgreSQL` instance.
pub struct EmbeddedPostgres {
    pub postgresql: PostgreSQL,
    pub port: u16,
    pub database_url: String,
    pub user: String,
    pub password: String,
}

impl EmbeddedPostgres {
    /// `[url, user, password]` for the test database.
    #[must_use]
    pub fn connect_args(&self) -> ConnectArgs {
        ConnectArgs::List(vec![
            self.database_url.clone(),
            self.user.clone(),
            self.password.clone(),
        ])
    }

    /// Open a connection to the test database.
    ///
    /// # Errors
    /// Returns `SqlBridgeError::ConnectionError` if the server refuses the connection.
    pub fn connect(&self) -> Result<Connection, crate::SqlBridgeError> {
        register_builtin_drivers().connect("postgres", self.connect_args(), &Default::default())
    }
}

/// Set up an embedded `PostgreSQL` instance and create `db_name` on it.
///
/// # Errors
/// Returns an error if the embedded server cannot be set up or started, the database cannot be
/// created, or the post-start connectivity check fails.
pub fn setup_postgres_embedded(
    db_name: &str,
) -> Result<EmbeddedPostgres, Box<dyn std::error::Error>> {
    let (postgresql, port, host, user, password) = SHARED_RUNTIME.block_on(async {
        let mut postgresql = PostgreSQL::default();

        // Bundled binaries, so no download
        postgresql.setup().await?;
        postgresql.start().await?;
        postgresql.create_database(db_name).await?;

        let settings = postgresql.settings();
        let port = settings.port;
        let host = settings.host.clone();
        let user = settings.username.clone();
        let password = settings.password.clone();
        Ok::<_, Box<dyn std::error::Error>>((postgresql, port, host, user, password))
    })?;

    let database_url = format!("postgres://{host}:{port}/{db_name}");
    tracing::info!(port, database = db_name, "embedded PostgreSQL started");

    let embedded = EmbeddedPostgres {
        postgresql,
        port,
        database_url,
        user,
        password,
    };

    // The session runs its own runtime, so this has to happen outside `block_on`.
    let conn = embedded.connect()?;
    let mut cursor = conn.cursor()?;
    cursor.execute("SELECT 1", &[])?;
    conn.close()?;

    Ok(embedded)
}

/// Stop a previously started embedded `PostgreSQL` instance.
pub fn stop_postgres_embedded(postgres: EmbeddedPostgres) {
    let EmbeddedPostgres { postgresql, .. } = postgres;
    SHARED_RUNTIME.block_on(async move {
        let _ = postgresql.stop().await;
    });
}
