//! Mock database client for testing.
//!
//! Serves scripted results keyed by SQL text and can be told to fail on close.

use super::{closed_session, DatabaseClient, QueryOutput};
use crate::error::{Result, SqlViewError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Counters shared between a mock client and the test that created it.
#[derive(Debug, Default)]
pub struct MockStats {
    queries: AtomicUsize,
    closes: AtomicUsize,
    abandons: AtomicUsize,
}

impl MockStats {
    /// Number of queries submitted to the client.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Number of times `close` was called while the session was open.
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Number of times the session was dropped without a close.
    pub fn abandons(&self) -> usize {
        self.abandons.load(Ordering::SeqCst)
    }
}

/// A mock database client that returns predefined results.
#[derive(Debug)]
pub struct MockDatabaseClient {
    results: HashMap<String, QueryOutput>,
    open: bool,
    close_error: Option<String>,
    latency: Option<Duration>,
    stats: Arc<MockStats>,
}

impl MockDatabaseClient {
    /// Creates an open mock client that knows no queries.
    pub fn new() -> Self {
        Self {
            results: HashMap::new(),
            open: true,
            close_error: None,
            latency: None,
            stats: Arc::new(MockStats::default()),
        }
    }

    /// Registers the output returned for `sql`. Unknown SQL is rejected as a syntax error.
    pub fn with_result(mut self, sql: impl Into<String>, output: QueryOutput) -> Self {
        self.results.insert(sql.into(), output);
        self
    }

    /// Makes `close` fail with the given message. The session still ends up closed.
    pub fn failing_close(mut self, message: impl Into<String>) -> Self {
        self.close_error = Some(message.into());
        self
    }

    /// Delays every query by `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Returns the shared counters for this client.
    pub fn stats(&self) -> Arc<MockStats> {
        Arc::clone(&self.stats)
    }
}

impl Default for MockDatabaseClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn fetch_result(&mut self, sql: &str) -> Result<QueryOutput> {
        if !self.open {
            return Err(closed_session());
        }
        self.stats.queries.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        self.results
            .get(sql.trim())
            .cloned()
            .ok_or_else(|| SqlViewError::query(format!("syntax error near \"{}\"", sql.trim())))
    }

    async fn close(&mut self) -> Result<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.stats.closes.fetch_add(1, Ordering::SeqCst);

        match &self.close_error {
            Some(message) => Err(SqlViewError::disconnect(message.clone())),
            None => Ok(()),
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn abandon(&mut self) {
        if self.open {
            self.open = false;
            self.stats.abandons.fetch_add(1, Ordering::SeqCst);
        }
    }
}
