//! Query execution for sqlview.
//!
//! Isolates running SQL and materializing its result from the front end.

pub mod materializer;
pub mod runner;

pub use materializer::{execute, materialize};
pub use runner::QueryRunner;
