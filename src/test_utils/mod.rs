//! Helpers for integration tests: SQL fixtures, driver selection from the environment and,
//! with `test-utils-postgres`, an embedded `PostgreSQL` server.

mod fixtures;

pub use fixtures::{
    connect_args_from_env, connect_from_env, driver_from_env, driver_specific_sql, init_tracing,
    run_sql_file, run_sql_script,
};

#[cfg(feature = "test-utils-postgres")]
use std::sync::LazyLock;
#[cfg(feature = "test-utils-postgres")]
use tokio::runtime::Runtime;

/// Shared tokio runtime for test utilities to avoid creating multiple runtimes
#[cfg(feature = "test-utils-postgres")]
pub(crate) static SHARED_RUNTIME: LazyLock<Runtime> =
    LazyLock::new(|| Runtime::new().expect("Failed to create tokio runtime for test utilities"));

/// Embedded `PostgreSQL` for tests
#[cfg(feature = "test-utils-postgres")]
pub mod postgres;
