//! The single operation the front end calls: run one query end to end.

use std::time::Duration;

use tracing::debug;

use crate::config::ConnectionSettings;
use crate::connection::ConnectionGateway;
use crate::error::Result;
use crate::query::materializer;
use crate::table::ResultTable;

/// Runs each query on a fresh session: connect, execute, disconnect.
pub struct QueryRunner {
    settings: ConnectionSettings,
    timeout: Option<Duration>,
    gateway: ConnectionGateway,
}

impl QueryRunner {
    /// Creates a runner for the given connection settings.
    pub fn new(settings: ConnectionSettings, timeout: Option<Duration>) -> Self {
        Self {
            settings,
            timeout,
            gateway: ConnectionGateway::new(),
        }
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Returns true while a query is holding a session open.
    pub fn is_connected(&self) -> bool {
        self.gateway.is_connected()
    }

    /// Runs `text` and returns its table.
    ///
    /// The session is released on every path, including a rejected query.
    pub async fn run_query(&mut self, text: &str) -> Result<ResultTable> {
        let client = self.gateway.connect(&self.settings).await?;
        let result = materializer::execute(client, text, self.timeout).await;
        self.gateway.disconnect().await;

        if let Err(e) = &result {
            debug!("Query failed: {e}");
        }
        result
    }
}
