//! SQLite database client implementation.
//!
//! SQLite has no accounts, so the user and password in the settings are
//! accepted and ignored.

use super::{
    closed_session, execution_error, multiple_statements, ColumnInfo, DatabaseClient,
    QueryOutput, Value,
};
use crate::config::ConnectionSettings;
use crate::error::{Result, SqlViewError};
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::sqlite::{SqliteColumn, SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{
    Column as SqlxColumn, Connection, Either, Executor, Row as SqlxRow, TypeInfo, ValueRef,
};
use std::str::FromStr;
use tracing::{debug, warn};

/// SQLite database client.
#[derive(Debug)]
pub struct SqliteClient {
    conn: Option<SqliteConnection>,
}

impl SqliteClient {
    /// Opens the database file named by the URL. The file must already exist.
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self> {
        let options = connect_options(settings)?;

        if settings.user.is_some() || settings.password.is_some() {
            debug!("SQLite does not use credentials; ignoring user and password");
        }

        let conn = SqliteConnection::connect_with(&options)
            .await
            .map_err(|e| map_connection_error(e, settings))?;

        debug!("Opened SQLite database (read_only: {})", settings.read_only);
        Ok(Self { conn: Some(conn) })
    }
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    async fn fetch_result(&mut self, sql: &str) -> Result<QueryOutput> {
        let conn = self.conn.as_mut().ok_or_else(closed_session)?;

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
            warn!("Abandoned SQLite session; a running statement finishes in the background");
        }
    }
}

fn connect_options(settings: &ConnectionSettings) -> Result<SqliteConnectOptions> {
    let options = SqliteConnectOptions::from_str(&settings.url)
        .map_err(|e| SqlViewError::connection(format!("Invalid connection URL: {e}")))?;

    Ok(options.read_only(settings.read_only))
}

fn column_info(columns: &[SqliteColumn]) -> Vec<ColumnInfo> {
    columns
        .iter()
        .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
        .collect()
}

fn convert_row(row: &SqliteRow) -> Result<Vec<Value>> {
    (0..row.len()).map(|i| convert_value(row, i)).collect()
}

/// Decodes a cell by its runtime storage class.
fn convert_value(row: &SqliteRow, index: usize) -> Result<Value> {
    let storage_class = {
        let raw = row
            .try_get_raw(index)
            .map_err(|e| SqlViewError::query(format!("Failed to read column {index}: {e}")))?;
        if raw.is_null() {
            return Ok(Value::Null);
        }
        raw.type_info().name().to_uppercase()
    };

    let decoded = match storage_class.as_str() {
        "INTEGER" | "BOOLEAN" => row.try_get_unchecked::<i64, _>(index).map(Value::Int),
        "REAL" => row.try_get_unchecked::<f64, _>(index).map(Value::Float),
        "BLOB" => row.try_get_unchecked::<Vec<u8>, _>(index).map(Value::Bytes),
        _ => row.try_get_unchecked::<String, _>(index).map(Value::Text),
    };

    decoded.map_err(|e| SqlViewError::query(format!("Failed to decode column {index}: {e}")))
}

/// Uses the engine's own message when the error came from SQLite.
fn format_query_error(error: sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => db_error.message().to_string(),
        None => error.to_string(),
    }
}

fn map_connection_error(error: sqlx::Error, settings: &ConnectionSettings) -> SqlViewError {
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("unable to open database file") {
        SqlViewError::connection(format!(
            "Cannot open database '{}'. Check that the file exists.",
            settings.url
        ))
    } else {
        SqlViewError::connection(error.to_string())
    }
}
