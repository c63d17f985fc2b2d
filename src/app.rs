//! Application state shared by the front end's event handlers.
//!
//! Holds the query text, the default query and the table currently on
//! display, and applies the recovery policy when a query fails.

use tracing::{info, warn};

use crate::error::{Result, SqlViewError};
use crate::query::QueryRunner;
use crate::table::ResultTable;

/// Message shown after the last action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// The last query succeeded.
    Loaded { rows: usize, columns: usize },
    /// The last query failed. `category` is the error's display label.
    Failed {
        category: &'static str,
        message: String,
        /// The input was restored to the default query.
        reset: bool,
    },
}

/// Explicit state object passed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    query_text: String,
    default_query: String,
    table: Option<ResultTable>,
    status: Option<Status>,
}

impl AppState {
    /// Creates state with the input seeded with `default_query`.
    pub fn new(default_query: impl Into<String>) -> Self {
        let default_query = default_query.into();
        Self {
            query_text: default_query.clone(),
            default_query,
            table: None,
            status: None,
        }
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn set_query_text(&mut self, text: impl Into<String>) {
        self.query_text = text.into();
    }

    pub fn default_query(&self) -> &str {
        &self.default_query
    }

    /// The table on display, if any.
    pub fn table(&self) -> Option<&ResultTable> {
        self.table.as_ref()
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// Runs the current query text and updates the display.
    ///
    /// A rejected query clears the table and restores the default text.
    /// Any other failure keeps both as they were.
    pub async fn submit(&mut self, runner: &mut QueryRunner) {
        let outcome = runner.run_query(&self.query_text).await;
        self.apply(outcome);
    }

    /// Applies the outcome of a query run to the display state.
    pub fn apply(&mut self, outcome: Result<ResultTable>) {
        match outcome {
            Ok(table) => {
                info!("Displaying {} rows", table.row_count());
                self.status = Some(Status::Loaded {
                    rows: table.row_count(),
                    columns: table.column_count(),
                });
                self.table = Some(table);
            }
            Err(e) if e.is_query() => {
                warn!("Query rejected, restoring default query: {e}");
                self.table = None;
                self.query_text = self.default_query.clone();
                self.status = Some(failed(&e, true));
            }
            Err(e) => {
                warn!("Query not run: {e}");
                self.status = Some(failed(&e, false));
            }
        }
    }

    /// Restores the default query text and clears the status line.
    pub fn reset(&mut self) {
        self.query_text = self.default_query.clone();
        self.status = None;
    }
}

fn failed(error: &SqlViewError, reset: bool) -> Status {
    Status::Failed {
        category: error.category(),
        message: error.to_string(),
        reset,
    }
}
