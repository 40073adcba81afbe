// crates/connector-sentinel-config/src/lib.rs
// ============================================================================
// Module: Connector Sentinel Config Library
// Description: Harness configuration model, secret source, and connector catalog.
// Purpose: Single source of truth for connector-sentinel.toml semantics.
// Dependencies: connector-sentinel-core, serde, serde_json, toml
// ============================================================================

//! ## Overview
//! `connector-sentinel-config` loads the harness configuration file, resolves
//! gateway and connector secrets from an environment JSON document, and ships
//! the built-in connector catalog used when the file lists no connectors.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod config;
pub mod source;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::builtin_catalog;
pub use config::*;
pub use source::EnvConfigSource;
pub use source::EnvSourceConfig;
