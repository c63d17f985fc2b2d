//! Display-ready result tables.
//!
//! A `ResultTable` is a late-bound schema: its columns are only known once a
//! query has run, and every cell has already been turned into text.

use crate::error::{Result, SqlViewError};
use serde::Serialize;

/// One column of a result table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    /// Display name reported by the engine.
    pub name: String,

    /// 0-based position, left to right.
    pub ordinal: usize,

    /// Engine type name. Informational only, cells are always text.
    pub type_name: String,
}

/// One row of stringified cells, in column order.
pub type Row = Vec<String>;

/// Columns plus rows, produced fresh for every query and never changed afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultTable {
    columns: Vec<ColumnDescriptor>,
    rows: Vec<Row>,
}

impl ResultTable {
    /// Builds a table, checking that every row has one cell per column.
    pub fn new(columns: Vec<ColumnDescriptor>, rows: Vec<Row>) -> Result<Self> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(SqlViewError::internal(format!(
                "Row {index} has {} values but the result has {} columns",
                row.len(),
                columns.len()
            )));
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the query matched no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Name of the column at a 0-based ordinal.
    pub fn column_name(&self, ordinal: usize) -> Option<&str> {
        self.columns.get(ordinal).map(|c| c.name.as_str())
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Cell text at 0-based row and column positions.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }
}
