//! Turns a query into a display table.
//!
//! The materializer holds no state: each call borrows an open session, runs
//! one query and hands back a brand-new `ResultTable`.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::db::{DatabaseClient, QueryOutput};
use crate::error::{Result, SqlViewError};
use crate::table::{ColumnDescriptor, ResultTable};

/// Runs `query` on the borrowed session and materializes its result.
///
/// The text is sent verbatim. Nothing is returned on failure, so a caller's
/// previous table stays as it was. The session is never closed here, but one
/// that hits the timeout is abandoned and unusable afterwards.
pub async fn execute(
    client: &mut dyn DatabaseClient,
    query: &str,
    timeout: Option<Duration>,
) -> Result<ResultTable> {
    if query.trim().is_empty() {
        return Err(SqlViewError::query("Query is empty"));
    }

    let start = Instant::now();
    let output = match timeout {
        Some(limit) => {
            let outcome = tokio::time::timeout(limit, client.fetch_result(query)).await;
            match outcome {
                Ok(output) => output?,
                Err(_) => {
                    // The engine may still be busy; a graceful close would wait for it
                    client.abandon();
                    return Err(SqlViewError::query(format!(
                        "Query timed out after {}",
                        describe_limit(limit)
                    )));
                }
            }
        }
        None => client.fetch_result(query).await?,
    };

    let table = materialize(output)?;
    info!(
        "Query returned {} rows, {} columns ({}ms)",
        table.row_count(),
        table.column_count(),
        start.elapsed().as_millis()
    );

    Ok(table)
}

fn describe_limit(limit: Duration) -> String {
    if limit.subsec_millis() == 0 {
        format!("{} seconds", limit.as_secs())
    } else {
        format!("{} ms", limit.as_millis())
    }
}

/// Converts decoded backend output into a table of strings.
pub fn materialize(output: QueryOutput) -> Result<ResultTable> {
    let columns = output
        .columns
        .into_iter()
        .enumerate()
        .map(|(ordinal, col)| ColumnDescriptor {
            name: col.name,
            ordinal,
            type_name: col.data_type,
        })
        .collect();

    let rows = output
        .rows
        .iter()
        .map(|row| row.iter().map(|value| value.to_display_string()).collect())
        .collect();

    debug!("Materialized {} rows", output.rows.len());
    ResultTable::new(columns, rows)
}
