// crates/connector-sentinel-gateway/src/lib.rs
// ============================================================================
// Module: Connector Sentinel Gateway Library
// Description: SQL gateway client for connector verification.
// Purpose: Implement the gateway boundary over the MySQL wire protocol.
// Dependencies: connector-sentinel-core, sqlx, tokio
// ============================================================================

//! ## Overview
//! Provides [`MySqlGateway`], the production [`GatewayConnector`] used by the
//! harness, plus the error classification it applies to server replies.
//!
//! [`GatewayConnector`]: connector_sentinel_core::GatewayConnector

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod mysql;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use mysql::DEFAULT_CONNECT_TIMEOUT;
pub use mysql::MySqlGateway;
pub use mysql::classify_server_error;
pub use mysql::connect_options;
