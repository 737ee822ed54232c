use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlBridgeError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Connection is closed")]
    ConnectionClosed,

    #[error("Binding error: {0}")]
    BindingError(String),

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("Cursor is closed")]
    CursorClosed,

    #[error("No result set pending; the last statement did not produce rows")]
    NoResultSet,

    #[error("Batch failed at parameter set {index}: {source}")]
    BatchError {
        index: usize,
        #[source]
        source: Box<SqlBridgeError>,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),
}

impl SqlBridgeError {
    /// Wrap an error raised by parameter set `index` of a batch.
    #[must_use]
    pub fn in_batch(self, index: usize) -> Self {
        SqlBridgeError::BatchError {
            index,
            source: Box::new(self),
        }
    }

    /// True for errors raised because the cursor or its connection is gone.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            SqlBridgeError::CursorClosed | SqlBridgeError::ConnectionClosed
        )
    }
}
