//! Shared SQLite fixtures.

use sqlview::config::ConnectionSettings;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;
use tempfile::TempDir;

/// An `employees` table in a fresh database file.
///
/// The directory must outlive the settings, so both are returned.
pub async fn employees_db(rows: &[(i64, &str, &str)]) -> (TempDir, ConnectionSettings) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("salesDB.sqlite");

    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let mut conn = SqliteConnection::connect_with(&options).await.unwrap();

    sqlx::raw_sql(
        "CREATE TABLE employees (
            employeeID INTEGER PRIMARY KEY,
            firstName TEXT NOT NULL,
            lastName TEXT NOT NULL,
            hireDate DATE,
            salary REAL
        )",
    )
    .execute(&mut conn)
    .await
    .unwrap();

    for (id, first, last) in rows {
        sqlx::query(
            "INSERT INTO employees (employeeID, firstName, lastName, hireDate, salary)
             VALUES (?, ?, ?, '2019-03-01', 52000.0)",
        )
        .bind(*id)
        .bind(*first)
        .bind(*last)
        .execute(&mut conn)
        .await
        .unwrap();
    }

    conn.close().await.unwrap();

    let settings = ConnectionSettings::new(format!("sqlite://{}", path.display()))
        .with_credentials("twittwer", "12345");
    (dir, settings)
}

/// The default three-employee data set.
pub async fn staffed_db() -> (TempDir, ConnectionSettings) {
    employees_db(&[(1, "John", "Smith"), (2, "Mary", "Jones"), (3, "Ada", "Brown")]).await
}
