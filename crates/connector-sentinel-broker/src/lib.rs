// crates/connector-sentinel-broker/src/lib.rs
// ============================================================================
// Module: Connector Sentinel Broker Library
// Description: Incident reporters for connector verification failures.
// Purpose: Deliver deduplicated incidents to a status page or a local log.
// Dependencies: connector-sentinel-core, reqwest, serde_json, time, url
// ============================================================================

//! ## Overview
//! Connector Sentinel Broker provides ready-made [`IncidentReporter`]
//! implementations: the Instatus status page reporter used in production,
//! a JSON-lines log reporter for dry runs, and an in-memory reporter.
//!
//! [`IncidentReporter`]: connector_sentinel_core::IncidentReporter

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod reporter;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use reporter::DeliveredIncident;
pub use reporter::InstatusReporter;
pub use reporter::InstatusReporterConfig;
pub use reporter::LogReporter;
pub use reporter::MemoryReporter;
