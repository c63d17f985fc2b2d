//! Error types for sqlview.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for sqlview operations.
#[derive(Error, Debug)]
pub enum SqlViewError {
    /// Session could not be established (bad URL, auth failed, host unreachable, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// The engine rejected the query or its execution failed (syntax, unknown table, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Closing a session failed. Logged by the gateway, never returned to callers.
    #[error("Disconnect error: {0}")]
    Disconnect(String),

    /// Configuration errors (invalid config file, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SqlViewError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a disconnect error with the given message.
    pub fn disconnect(msg: impl Into<String>) -> Self {
        Self::Disconnect(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if the engine rejected the submitted query.
    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Disconnect(_) => "Disconnect Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using SqlViewError.
pub type Result<T> = std::result::Result<T, SqlViewError>;
