// crates/connector-sentinel-core/src/runtime/mod.rs
// ============================================================================
// Module: Connector Sentinel Runtime
// Description: Verification orchestration and the pure helpers it composes.
// Purpose: Execute connector verification cases against gateway and incident interfaces.
// Dependencies: crate::{core, interfaces}, rand, tracing
// ============================================================================

//! ## Overview
//! Runtime modules implement the verification case state machine together
//! with the query builder, incident templates, and name generator it relies
//! on.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod case;
pub mod naming;
pub mod query;
pub mod template;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use case::CaseConfig;
pub use case::CaseEnvironment;
pub use case::CaseError;
pub use case::CaseOutcome;
pub use case::CasePhase;
pub use case::CaseReport;
pub use case::CaseSettings;
pub use case::DEFAULT_CONFIG_NAMESPACE;
pub use case::DEFAULT_GATEWAY_CONFIG_KEY;
pub use case::DEFAULT_GATEWAY_TRACKING_ID;
pub use case::GatewayStatus;
pub use case::IncidentRecord;
pub use case::VerificationCase;
pub use naming::RandomNameGenerator;
pub use query::QueryBuilder;
pub use template::GATEWAY_INCIDENT_TITLE;
pub use template::render_connector_template;
pub use template::render_gateway_template;
