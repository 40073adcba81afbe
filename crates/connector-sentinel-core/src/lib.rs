// crates/connector-sentinel-core/src/lib.rs
// ============================================================================
// Module: Connector Sentinel Core Library
// Description: Public API surface for the connector verification core.
// Purpose: Expose core types, interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Connector Sentinel verifies external data-source and ML-engine connectors
//! by provisioning a throwaway instance through a managed SQL gateway and
//! escalating failures to an incident service. This crate is
//! backend-agnostic: the gateway client, config source, and incident service
//! plug in through the traits in [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::ConfigError;
pub use interfaces::ConfigSource;
pub use interfaces::ConnectFailure;
pub use interfaces::GatewayConnection;
pub use interfaces::GatewayConnector;
pub use interfaces::GatewayCursor;
pub use interfaces::GatewayError;
pub use interfaces::IncidentError;
pub use interfaces::IncidentReporter;
pub use interfaces::NameGenerator;
pub use runtime::CaseConfig;
pub use runtime::CaseEnvironment;
pub use runtime::CaseError;
pub use runtime::CaseOutcome;
pub use runtime::CasePhase;
pub use runtime::CaseReport;
pub use runtime::CaseSettings;
pub use runtime::GatewayStatus;
pub use runtime::IncidentRecord;
pub use runtime::QueryBuilder;
pub use runtime::RandomNameGenerator;
pub use runtime::VerificationCase;
