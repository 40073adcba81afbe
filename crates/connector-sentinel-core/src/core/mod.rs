// crates/connector-sentinel-core/src/core/mod.rs
// ============================================================================
// Module: Connector Sentinel Core Types
// Description: Canonical data model for connector verification runs.
// Purpose: Provide stable types for configs, statements, incidents, and failures.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Core types model the values that flow through one verification case:
//! resolved config bundles, the provisioning statement, the incident body and
//! its deduplication key, and the failure taxonomy.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod config;
pub mod descriptor;
pub mod failure;
pub mod identifiers;
pub mod incident;
pub mod statement;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigMapping;
pub use config::ConnectionConfig;
pub use config::ConnectorConfig;
pub use config::DEFAULT_GATEWAY_PORT;
pub use descriptor::ConnectorDescriptor;
pub use descriptor::TargetKind;
pub use failure::FailureKind;
pub use identifiers::ConnectorName;
pub use identifiers::ConnectorType;
pub use identifiers::IncidentKey;
pub use identifiers::InstanceName;
pub use identifiers::TrackingId;
pub use incident::IncidentAction;
pub use incident::IncidentBody;
pub use incident::IncidentReceipt;
pub use statement::ProvisioningStatement;
