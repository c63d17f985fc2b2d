//! Database abstraction layer for sqlview.
//!
//! Provides a trait-based interface over a single live session, allowing
//! different database backends to be used interchangeably.

mod mock;
mod postgres;
mod sqlite;
mod types;

pub use mock::{MockDatabaseClient, MockStats};
pub use postgres::PostgresClient;
pub use sqlite::SqliteClient;
pub use types::{ColumnInfo, QueryOutput, Value};

use crate::config::ConnectionSettings;
use crate::error::{Result, SqlViewError};
use async_trait::async_trait;
use tracing::debug;

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    Postgres,
    Sqlite,
}

impl DatabaseBackend {
    /// Returns the backend as a string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }

    /// Resolves a backend from a URL scheme.
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme.to_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::Postgres),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }
}

/// Opens a session for the backend named by the settings' URL.
///
/// This is the central factory function for database connections.
pub async fn connect(settings: &ConnectionSettings) -> Result<Box<dyn DatabaseClient>> {
    let backend = settings.backend()?;
    debug!("Opening {} session", backend.as_str());

    match backend {
        DatabaseBackend::Postgres => {
            let client = PostgresClient::connect(settings).await?;
            Ok(Box::new(client))
        }
        DatabaseBackend::Sqlite => {
            let client = SqliteClient::connect(settings).await?;
            Ok(Box::new(client))
        }
    }
}

/// One live session to a database engine.
///
/// Queries take `&mut self`, so a session never runs two queries at once.
#[async_trait]
pub trait DatabaseClient: Send {
    /// Executes SQL verbatim and returns its columns and decoded rows.
    ///
    /// Fails with `Query` when the engine rejects the statement and with
    /// `Connection` when the session itself is unusable.
    async fn fetch_result(&mut self, sql: &str) -> Result<QueryOutput>;

    /// Closes the session. Calling it on a closed session is a no-op.
    async fn close(&mut self) -> Result<()>;

    /// Returns true until the session has been closed.
    fn is_open(&self) -> bool;

    /// Drops the session without waiting for the engine.
    ///
    /// Used after a timeout, when a statement may still be running and a
    /// graceful close would block until it finishes.
    fn abandon(&mut self);
}

/// Returns true for sqlx errors that mean the session, not the statement, failed.
fn is_session_failure(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

/// Classifies an error raised while executing a statement.
fn execution_error(error: sqlx::Error, describe: impl FnOnce(sqlx::Error) -> String) -> SqlViewError {
    if is_session_failure(&error) {
        SqlViewError::connection(error.to_string())
    } else {
        SqlViewError::query(describe(error))
    }
}

/// Error for text that produced more than one result set.
fn multiple_statements() -> SqlViewError {
    SqlViewError::query("Only one statement can be run at a time")
}

/// Error for a query submitted on a session that was already closed.
fn closed_session() -> SqlViewError {
    SqlViewError::connection("Connection is closed")
}
