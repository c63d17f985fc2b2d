//! Connection management for sqlview.
//!
//! Centralizes the lifecycle of the single database session.

pub mod gateway;

pub use gateway::ConnectionGateway;
