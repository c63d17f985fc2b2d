//! Text and JSON rendering of result tables.
//!
//! Text output is a box-drawn table with auto-sized columns, scaled down to
//! fit the available width.

use crate::error::{Result, SqlViewError};
use crate::table::ResultTable;

/// Maximum width for any column.
const MAX_COLUMN_WIDTH: usize = 40;

/// Minimum width for any column.
const MIN_COLUMN_WIDTH: usize = 4;

/// Renders a table as lines of text, including a row-count footer.
pub fn render_table(table: &ResultTable, available_width: usize) -> Vec<String> {
    if table.columns().is_empty() {
        return vec!["(empty result)".to_string()];
    }

    let widths = fit_widths(&column_widths(table), available_width);
    let mut lines = Vec::with_capacity(table.row_count() + 5);

    lines.push(border(&widths, '┌', '┬', '┐'));
    lines.push(row_line(table.columns().iter().map(|c| c.name.as_str()), &widths));
    lines.push(border(&widths, '├', '┼', '┤'));
    for row in table.rows() {
        lines.push(row_line(row.iter().map(String::as_str), &widths));
    }
    lines.push(border(&widths, '└', '┴', '┘'));

    let count = table.row_count();
    lines.push(format!(
        "{} row{} returned",
        count,
        if count == 1 { "" } else { "s" }
    ));

    lines
}

/// Serializes a table as pretty-printed JSON.
pub fn render_json(table: &ResultTable) -> Result<String> {
    serde_json::to_string_pretty(table)
        .map_err(|e| SqlViewError::internal(format!("Failed to serialize result: {e}")))
}

/// Calculates the natural width of each column, capped at MAX_COLUMN_WIDTH.
fn column_widths(table: &ResultTable) -> Vec<usize> {
    let mut widths: Vec<usize> = table
        .columns()
        .iter()
        .map(|col| display_width(&col.name).max(MIN_COLUMN_WIDTH))
        .collect();

    for row in table.rows() {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }

    widths.iter().map(|&w| w.min(MAX_COLUMN_WIDTH)).collect()
}

/// Scales widths down proportionally when the table is wider than the screen.
fn fit_widths(widths: &[usize], available_width: usize) -> Vec<usize> {
    // borders and padding
    let total_width: usize = widths.iter().sum::<usize>() + widths.len() * 3 + 1;
    let scale_factor = if total_width > available_width && available_width > 0 {
        available_width as f64 / total_width as f64
    } else {
        1.0
    };

    widths
        .iter()
        .map(|&w| ((w as f64 * scale_factor) as usize).max(MIN_COLUMN_WIDTH))
        .collect()
}

fn display_width(s: &str) -> usize {
    s.chars().count()
}

/// Truncates a string to fit within the given width, adding ellipsis if needed.
fn truncate(s: &str, max_width: usize) -> String {
    if display_width(s) <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        s.chars().take(max_width).collect()
    } else {
        let kept: String = s.chars().take(max_width - 3).collect();
        format!("{kept}...")
    }
}

fn border(widths: &[usize], left: char, mid: char, right: char) -> String {
    let segments: Vec<String> = widths.iter().map(|&w| "─".repeat(w + 2)).collect();
    format!("{left}{}{right}", segments.join(&mid.to_string()))
}

fn row_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let mut line = String::from("│");
    for (cell, &width) in cells.zip(widths) {
        let text = truncate(&cell.replace('\n', " "), width);
        let padding = width.saturating_sub(display_width(&text));
        line.push(' ');
        line.push_str(&text);
        line.push_str(&" ".repeat(padding));
        line.push_str(" │");
    }
    line
}
