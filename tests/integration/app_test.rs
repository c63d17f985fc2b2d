//! Application state tests driven through a real query runner.

use super::fixtures::{employees_db, staffed_db};
use pretty_assertions::assert_eq;
use sqlview::app::{AppState, Status};
use sqlview::config::{ConnectionSettings, DEFAULT_QUERY};
use sqlview::query::QueryRunner;

#[tokio::test]
async fn test_default_query_shows_every_employee() {
    let (_dir, settings) = staffed_db().await;
    let mut runner = QueryRunner::new(settings, None);
    let mut state = AppState::new(DEFAULT_QUERY);

    state.submit(&mut runner).await;

    let table = state.table().unwrap();
    assert_eq!(table.column_count(), 5);
    assert_eq!(table.row_count(), 3);
    assert_eq!(
        state.status(),
        Some(&Status::Loaded { rows: 3, columns: 5 })
    );
    assert!(!runner.is_connected());
}

#[tokio::test]
async fn test_empty_table_still_has_header() {
    let (_dir, settings) = employees_db(&[]).await;
    let mut runner = QueryRunner::new(settings, None);
    let mut state = AppState::new(DEFAULT_QUERY);

    state.submit(&mut runner).await;

    let table = state.table().unwrap();
    assert_eq!(table.column_count(), 5);
    assert!(table.is_empty());
}

#[tokio::test]
async fn test_rejected_query_restores_default() {
    let (_dir, settings) = staffed_db().await;
    let mut runner = QueryRunner::new(settings, None);
    let mut state = AppState::new(DEFAULT_QUERY);

    state.set_query_text("SELECT lastName FROM employees WHERE employeeID = 1");
    state.submit(&mut runner).await;
    assert_eq!(state.table().unwrap().cell(0, 0), Some("Smith"));

    state.set_query_text("SELEKT *");
    state.submit(&mut runner).await;

    assert!(state.table().is_none());
    assert_eq!(state.query_text(), DEFAULT_QUERY);
    assert!(matches!(
        state.status(),
        Some(Status::Failed { category: "Query Error", .. })
    ));
    assert!(!runner.is_connected());

    // The next submit works normally
    state.submit(&mut runner).await;
    assert_eq!(state.table().unwrap().row_count(), 3);
}

#[tokio::test]
async fn test_connection_failure_keeps_input() {
    let dir = tempfile::tempdir().unwrap();
    let settings = ConnectionSettings::new(format!(
        "sqlite://{}",
        dir.path().join("salesDB.sqlite").display()
    ));
    let mut runner = QueryRunner::new(settings, None);
    let mut state = AppState::new(DEFAULT_QUERY);

    state.set_query_text("SELECT lastName FROM employees");
    state.submit(&mut runner).await;

    assert!(state.table().is_none());
    assert_eq!(state.query_text(), "SELECT lastName FROM employees");
    assert!(matches!(
        state.status(),
        Some(Status::Failed { category: "Connection Error", .. })
    ));
}

#[tokio::test]
async fn test_multiple_statements_restore_default() {
    let (_dir, settings) = staffed_db().await;
    let mut runner = QueryRunner::new(settings, None);
    let mut state = AppState::new(DEFAULT_QUERY);

    state.set_query_text("SELECT 1; SELECT 1, 2");
    state.submit(&mut runner).await;

    assert!(state.table().is_none());
    assert_eq!(state.query_text(), DEFAULT_QUERY);
    assert!(matches!(
        state.status(),
        Some(Status::Failed { category: "Query Error", reset: true, .. })
    ));
}
