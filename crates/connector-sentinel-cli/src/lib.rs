// crates/connector-sentinel-cli/src/lib.rs
// ============================================================================
// Module: Connector Sentinel CLI Library
// Description: Shared helpers for the Connector Sentinel command-line interface.
// Purpose: Keep reporter selection and run summaries testable outside the binary.
// Dependencies: connector-sentinel-broker, connector-sentinel-config, connector-sentinel-core
// ============================================================================

//! ## Overview
//! The binary entry point (`src/main.rs`) parses arguments and wires the
//! gateway adapter; this library holds the parts that do not touch the
//! process: choosing an incident backend and running a batch of verification
//! cases into a [`runner::RunSummary`].

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Incident backend selection.
pub mod backend;
/// Batch execution and run summaries.
pub mod runner;

#[cfg(test)]
mod tests;
