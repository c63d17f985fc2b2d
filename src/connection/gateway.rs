//! Connection gateway: owns the one live session.

use tracing::{debug, warn};

use crate::config::ConnectionSettings;
use crate::db::DatabaseClient;
use crate::error::{Result, SqlViewError};

/// Opens and closes the application's single database session.
///
/// The gateway owns the handle for its whole open lifetime; callers only
/// borrow it. At most one handle is alive at a time.
#[derive(Default)]
pub struct ConnectionGateway {
    active: Option<Box<dyn DatabaseClient>>,
}

impl ConnectionGateway {
    /// Creates a gateway with no open session.
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Opens a session and returns a borrow of it.
    ///
    /// A handle that is still open is closed before the new one replaces it.
    pub async fn connect(
        &mut self,
        settings: &ConnectionSettings,
    ) -> Result<&mut dyn DatabaseClient> {
        if self.active.is_some() {
            warn!("connect called with a session already open; closing it first");
            self.disconnect().await;
        }

        debug!("Connecting to {}", settings.display_string());
        let client = crate::db::connect(settings).await?;
        Ok(self.attach(client))
    }

    /// Adopts an already open client as the gateway's session.
    pub fn attach(&mut self, client: Box<dyn DatabaseClient>) -> &mut dyn DatabaseClient {
        &mut **self.active.insert(client)
    }

    /// Closes the session if one is open.
    ///
    /// Never fails: a close error is logged and the gateway is closed afterwards
    /// either way.
    pub async fn disconnect(&mut self) {
        let Some(mut client) = self.active.take() else {
            return;
        };

        if let Err(e) = client.close().await {
            let error = match e {
                SqlViewError::Disconnect(_) => e,
                other => SqlViewError::disconnect(other.to_string()),
            };
            warn!("{}: {}", error.category(), error);
        } else {
            debug!("Disconnected");
        }
    }

    /// Check if there's an open session.
    pub fn is_connected(&self) -> bool {
        self.active.is_some()
    }

    /// Get the open session.
    pub fn client(&mut self) -> Option<&mut dyn DatabaseClient> {
        match self.active.as_mut() {
            Some(client) => Some(client.as_mut()),
            None => None,
        }
    }
}

impl Drop for ConnectionGateway {
    fn drop(&mut self) {
        if self.active.as_ref().is_some_and(|client| client.is_open()) {
            warn!("Connection gateway dropped with an open session; the driver will close it");
        }
    }
}
