//! End-to-end runs through `QueryRunner`, including the timeout path.

use std::time::{Duration, Instant};

use super::fixtures::staffed_db;
use sqlview::query::QueryRunner;

/// Counts far enough that SQLite needs many seconds to answer.
const SLOW_QUERY: &str = "WITH RECURSIVE n(x) AS (
    SELECT 1 UNION ALL SELECT x + 1 FROM n WHERE x < 200000000
) SELECT count(*) AS total FROM n";

#[tokio::test]
async fn test_timeout_releases_caller_promptly() {
    let (_dir, settings) = staffed_db().await;
    let mut runner = QueryRunner::new(settings, Some(Duration::from_millis(200)));

    let start = Instant::now();
    let err = runner.run_query(SLOW_QUERY).await.unwrap_err();
    let elapsed = start.elapsed();

    assert!(err.is_query());
    assert_eq!(err.category(), "Query Error");
    assert!(err.to_string().contains("200 ms"), "unexpected message: {err}");
    assert!(elapsed < Duration::from_secs(3), "took {elapsed:?}");
    assert!(!runner.is_connected());
}

#[tokio::test]
async fn test_runner_recovers_after_timeout() {
    let (_dir, settings) = staffed_db().await;
    let mut runner = QueryRunner::new(settings, Some(Duration::from_millis(200)));

    assert!(runner.run_query(SLOW_QUERY).await.is_err());

    let table = runner
        .run_query("SELECT lastName FROM employees WHERE employeeID = 1")
        .await
        .unwrap();
    assert_eq!(table.cell(0, 0), Some("Smith"));
}

#[tokio::test]
async fn test_generous_timeout_does_not_interfere() {
    let (_dir, settings) = staffed_db().await;
    let mut runner = QueryRunner::new(settings, Some(Duration::from_secs(30)));

    let table = runner.run_query("SELECT * FROM employees").await.unwrap();
    assert_eq!(table.row_count(), 3);
}
