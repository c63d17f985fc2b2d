//! sqlview - run SQL against a database and view the result as a table.
//!
//! This library exposes the core modules for the binary and integration tests.

pub mod app;
pub mod config;
pub mod connection;
pub mod db;
pub mod error;
pub mod logging;
pub mod query;
pub mod render;
pub mod table;
