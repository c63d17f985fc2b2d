//! Query materialization integration tests.
//!
//! Runs real SQL through the gateway and materializer.

use super::fixtures::{employees_db, staffed_db};
use pretty_assertions::assert_eq;
use sqlview::connection::ConnectionGateway;
use sqlview::error::SqlViewError;
use sqlview::query::execute;

#[tokio::test]
async fn test_single_column_lookup() {
    let (_dir, settings) = staffed_db().await;
    let mut gateway = ConnectionGateway::new();
    let client = gateway.connect(&settings).await.unwrap();

    let table = execute(
        client,
        "SELECT lastName FROM employees WHERE employeeID = 1",
        None,
    )
    .await
    .unwrap();

    assert_eq!(table.column_names(), vec!["lastName"]);
    assert_eq!(table.rows().to_vec(), vec![vec!["Smith".to_string()]]);

    gateway.disconnect().await;
}

#[tokio::test]
async fn test_select_star_on_empty_table_keeps_columns() {
    let (_dir, settings) = employees_db(&[]).await;
    let mut gateway = ConnectionGateway::new();
    let client = gateway.connect(&settings).await.unwrap();

    let table = execute(client, "SELECT * FROM employees", None)
        .await
        .unwrap();

    assert_eq!(
        table.column_names(),
        vec!["employeeID", "firstName", "lastName", "hireDate", "salary"]
    );
    assert_eq!(table.row_count(), 0);

    gateway.disconnect().await;
}

#[tokio::test]
async fn test_shape_matches_projection_and_matches() {
    let (_dir, settings) = staffed_db().await;
    let mut gateway = ConnectionGateway::new();
    let client = gateway.connect(&settings).await.unwrap();

    let table = execute(
        client,
        "SELECT employeeID, firstName, lastName FROM employees WHERE employeeID <= 2 ORDER BY employeeID DESC",
        None,
    )
    .await
    .unwrap();

    assert_eq!(table.column_count(), 3);
    assert_eq!(table.row_count(), 2);
    assert!(table.rows().iter().all(|row| row.len() == 3));
    assert_eq!(
        table.columns().iter().map(|c| c.ordinal).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    // Engine order is preserved
    assert_eq!(table.cell(0, 0), Some("2"));
    assert_eq!(table.cell(1, 2), Some("Smith"));

    gateway.disconnect().await;
}

#[tokio::test]
async fn test_typed_values_become_text() {
    let (_dir, settings) = staffed_db().await;
    let mut gateway = ConnectionGateway::new();
    let client = gateway.connect(&settings).await.unwrap();

    let table = execute(
        client,
        "SELECT employeeID, hireDate, salary, NULL AS bonus FROM employees WHERE employeeID = 3",
        None,
    )
    .await
    .unwrap();

    assert_eq!(
        table.rows().to_vec(),
        vec![vec![
            "3".to_string(),
            "2019-03-01".to_string(),
            "52000.0".to_string(),
            "NULL".to_string(),
        ]]
    );

    gateway.disconnect().await;
}

#[tokio::test]
async fn test_malformed_query_leaves_handle_usable() {
    let (_dir, settings) = staffed_db().await;
    let mut gateway = ConnectionGateway::new();
    let client = gateway.connect(&settings).await.unwrap();

    let err = execute(&mut *client, "SELEKT *", None).await.unwrap_err();
    assert!(matches!(err, SqlViewError::Query(_)));
    assert!(err.to_string().contains("syntax error"));

    let table = execute(client, "SELECT COUNT(*) AS total FROM employees", None)
        .await
        .unwrap();
    assert_eq!(table.cell(0, 0), Some("3"));

    gateway.disconnect().await;
}

#[tokio::test]
async fn test_unknown_table_is_query_error() {
    let (_dir, settings) = staffed_db().await;
    let mut gateway = ConnectionGateway::new();
    let client = gateway.connect(&settings).await.unwrap();

    let err = execute(client, "SELECT * FROM customers", None)
        .await
        .unwrap_err();
    assert!(err.is_query());
    assert!(err.to_string().contains("customers"));

    gateway.disconnect().await;
}

#[tokio::test]
async fn test_same_query_twice_is_identical() {
    let (_dir, settings) = staffed_db().await;
    let mut gateway = ConnectionGateway::new();
    let client = gateway.connect(&settings).await.unwrap();

    let first = execute(&mut *client, "SELECT * FROM employees", None)
        .await
        .unwrap();
    let second = execute(client, "SELECT * FROM employees", None)
        .await
        .unwrap();

    assert_eq!(first, second);

    gateway.disconnect().await;
}

#[tokio::test]
async fn test_read_only_session_rejects_writes() {
    let (_dir, settings) = staffed_db().await;
    let mut gateway = ConnectionGateway::new();
    let client = gateway.connect(&settings).await.unwrap();

    let err = execute(client, "DELETE FROM employees", None)
        .await
        .unwrap_err();
    assert!(err.is_query());

    let client = gateway.client().unwrap();
    let table = execute(client, "SELECT COUNT(*) FROM employees", None)
        .await
        .unwrap();
    assert_eq!(table.cell(0, 0), Some("3"));

    gateway.disconnect().await;
}

#[tokio::test]
async fn test_writable_session_accepts_writes() {
    let (_dir, settings) = staffed_db().await;
    let settings = settings.with_read_only(false);
    let mut gateway = ConnectionGateway::new();
    let client = gateway.connect(&settings).await.unwrap();

    let table = execute(&mut *client, "DELETE FROM employees WHERE employeeID = 3", None)
        .await
        .unwrap();
    assert_eq!(table.column_count(), 0);
    assert!(table.is_empty());

    let table = execute(client, "SELECT COUNT(*) FROM employees", None)
        .await
        .unwrap();
    assert_eq!(table.cell(0, 0), Some("2"));

    gateway.disconnect().await;
}

#[tokio::test]
async fn test_second_result_set_is_rejected() {
    let (_dir, settings) = staffed_db().await;
    let mut gateway = ConnectionGateway::new();
    let client = gateway.connect(&settings).await.unwrap();

    let err = execute(
        &mut *client,
        "SELECT lastName FROM employees; SELECT 'x' AS other",
        None,
    )
    .await
    .unwrap_err();
    assert!(err.is_query());

    // A statement without rows still counts as the first result
    let err = execute(
        &mut *client,
        "SELECT lastName FROM employees WHERE employeeID = 99; SELECT 1, 'Smith'",
        None,
    )
    .await
    .unwrap_err();
    assert!(err.is_query());

    let table = execute(client, "SELECT lastName FROM employees WHERE employeeID = 1;", None)
        .await
        .unwrap();
    assert_eq!(table.rows().to_vec(), vec![vec!["Smith".to_string()]]);

    gateway.disconnect().await;
}
