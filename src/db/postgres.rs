//! PostgreSQL database client implementation.
//!
//! Provides the `PostgresClient` struct that implements the `DatabaseClient` trait
//! over a single sqlx `PgConnection`.

use super::{
    closed_session, execution_error, multiple_statements, ColumnInfo, DatabaseClient,
    QueryOutput, Value,
};
use crate::config::ConnectionSettings;
use crate::error::{Result, SqlViewError};
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::postgres::{PgColumn, PgConnectOptions, PgConnection, PgRow};
use sqlx::{
    Column as SqlxColumn, Connection, Either, Executor, Row as SqlxRow, TypeInfo, ValueRef,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Maximum number of connection retry attempts.
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay between retry attempts (doubles each retry).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// PostgreSQL database client.
#[derive(Debug)]
pub struct PostgresClient {
    conn: Option<PgConnection>,
}

impl PostgresClient {
    /// Opens a session, retrying transient failures with exponential backoff.
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self> {
        let options = connect_options(settings)?;

        let mut last_error = None;
        let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);

        for attempt in 1..=MAX_RETRY_ATTEMPTS {
            debug!("Connection attempt {} of {}", attempt, MAX_RETRY_ATTEMPTS);

            match PgConnection::connect_with(&options).await {
                Ok(conn) => {
                    debug!("Successfully connected to database");
                    return Ok(Self { conn: Some(conn) });
                }
                Err(e) => {
                    let is_transient = is_transient_error(&e);
                    last_error = Some(e);

                    if attempt < MAX_RETRY_ATTEMPTS && is_transient {
                        warn!(
                            "Connection attempt {} failed (transient error), retrying in {:?}",
                            attempt, delay
                        );
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    } else {
                        break;
                    }
                }
            }
        }

        Err(match last_error {
            Some(e) => map_connection_error(e, settings),
            None => SqlViewError::internal("No connection attempt was made"),
        })
    }
}

#[async_trait]
impl DatabaseClient for PostgresClient {
    async fn fetch_result(&mut self, sql: &str) -> Result<QueryOutput> {
        let conn = self.conn.as_mut().ok_or_else(closed_session)?;

        // Simple query protocol: the server sends every value in its text form.
        let (columns, rows) = {
            let mut stream = conn.fetch_many(sqlx::raw_sql(sql));
            let mut columns = None;
            let mut rows = Vec::new();
            let mut finished = false;

            while let Some(step) = stream
                .try_next()
                .await
                .map_err(|e| execution_error(e, format_query_error))?
            {
                match step {
                    // Anything after the first statement completes
                    _ if finished => return Err(multiple_statements()),
                    Either::Left(_) => finished = true,
                    Either::Right(row) => {
                        if columns.is_none() {
                            columns = Some(column_info(row.columns()));
                        }
                        rows.push(convert_row(&row)?);
                    }
                }
            }
            (columns, rows)
        };

        let columns = match columns {
            Some(columns) => columns,
            None => match conn.describe(sql).await {
                Ok(described) => column_info(described.columns()),
                Err(e) => {
                    warn!("Could not describe empty result: {e}");
                    Vec::new()
                }
            },
        };

        debug!("Fetched {} rows, {} columns", rows.len(), columns.len());
        Ok(QueryOutput::with_data(columns, rows))
    }

    async fn close(&mut self) -> Result<()> {
        match self.conn.take() {
            Some(conn) => conn
                .close()
                .await
                .map_err(|e| SqlViewError::disconnect(e.to_string())),
            None => Ok(()),
        }
    }

    fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    fn abandon(&mut self) {
        if self.conn.take().is_some() {
            warn!("Abandoned PostgreSQL session; the server cancels it when the socket closes");
        }
    }
}

/// Builds connect options from the URL, overriding credentials when given.
fn connect_options(settings: &ConnectionSettings) -> Result<PgConnectOptions> {
    let mut options = PgConnectOptions::from_str(&settings.url)
        .map_err(|e| SqlViewError::connection(format!("Invalid connection URL: {e}")))?;

    if let Some(user) = &settings.user {
        options = options.username(user);
    }
    if let Some(password) = &settings.password {
        options = options.password(password);
    }
    if settings.read_only {
        options = options.options([("default_transaction_read_only", "on")]);
    }

    Ok(options.application_name("sqlview"))
}

fn column_info(columns: &[PgColumn]) -> Vec<ColumnInfo> {
    columns
        .iter()
        .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
        .collect()
}

/// Converts a text-format PgRow to decoded values.
fn convert_row(row: &PgRow) -> Result<Vec<Value>> {
    (0..row.len()).map(|i| convert_value(row, i)).collect()
}

fn convert_value(row: &PgRow, index: usize) -> Result<Value> {
    let type_name = {
        let raw = row
            .try_get_raw(index)
            .map_err(|e| SqlViewError::query(format!("Failed to read column {index}: {e}")))?;
        if raw.is_null() {
            return Ok(Value::Null);
        }
        raw.type_info().name().to_uppercase()
    };

    let decode_error =
        |e: sqlx::Error| SqlViewError::query(format!("Failed to decode column {index}: {e}"));

    if type_name == "BYTEA" {
        return row
            .try_get_unchecked::<Vec<u8>, _>(index)
            .map(Value::Bytes)
            .map_err(decode_error);
    }

    let text = row
        .try_get_unchecked::<String, _>(index)
        .map_err(decode_error)?;

    Ok(match type_name.as_str() {
        "INT2" | "INT4" | "INT8" => text.parse().map_or(Value::Text(text), Value::Int),
        "FLOAT4" | "FLOAT8" => text.parse().map_or(Value::Text(text), Value::Float),
        _ => Value::Text(text),
    })
}

/// Determines if an error is transient and worth retrying.
fn is_transient_error(error: &sqlx::Error) -> bool {
    let error_str = error.to_string().to_lowercase();

    // Connection refused or timeout are often transient
    if error_str.contains("connection refused")
        || error_str.contains("timed out")
        || error_str.contains("timeout")
        || error_str.contains("temporarily unavailable")
        || error_str.contains("connection reset")
        || error_str.contains("broken pipe")
    {
        return true;
    }

    false
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, settings: &ConnectionSettings) -> SqlViewError {
    let (host, port) = Url::parse(&settings.url)
        .ok()
        .map(|url| {
            (
                url.host_str().unwrap_or("localhost").to_string(),
                url.port().unwrap_or(5432),
            )
        })
        .unwrap_or_else(|| ("localhost".to_string(), 5432));
    let user = settings.user.as_deref().unwrap_or("unknown");

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        SqlViewError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        SqlViewError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        SqlViewError::connection(error.to_string())
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        SqlViewError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        SqlViewError::connection(error.to_string())
    }
}

/// Formats a query error with detail and hint lines when the server sent them.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = String::from("ERROR: ");
    result.push_str(db_error.message());

    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        if let Some(detail) = pg_error.detail() {
            result.push_str("\n  DETAIL: ");
            result.push_str(detail);
        }

        if let Some(hint) = pg_error.hint() {
            result.push_str("\n  HINT: ");
            result.push_str(hint);
        }
    }

    result
}
