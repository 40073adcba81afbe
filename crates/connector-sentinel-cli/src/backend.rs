// crates/connector-sentinel-cli/src/backend.rs
// ============================================================================
// Module: Incident Backend Selection
// Description: Builds the incident reporter named by the harness config.
// Purpose: Resolve Instatus credentials from the environment, fail closed.
// Dependencies: connector-sentinel-broker, connector-sentinel-config
// ============================================================================

//! ## Overview
//! `build_reporter` turns `[incidents]` into a boxed
//! [`IncidentReporter`]. Instatus credentials are read through a lookup
//! function so callers decide where variables come from. A dry run always
//! selects the JSON-lines log reporter on stderr and needs no credentials.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use connector_sentinel_broker::InstatusReporter;
use connector_sentinel_broker::InstatusReporterConfig;
use connector_sentinel_broker::LogReporter;
use connector_sentinel_config::IncidentBackend;
use connector_sentinel_config::IncidentsConfig;
use connector_sentinel_core::IncidentError;
use connector_sentinel_core::IncidentReporter;
use thiserror::Error;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Reporter chosen for a run.
pub struct SelectedReporter {
    /// Backend label used in logs.
    pub label: &'static str,
    /// Reporter instance.
    pub reporter: Box<dyn IncidentReporter>,
}

/// Errors raised while building the incident reporter.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum BackendError {
    /// A required credential variable is unset or empty.
    #[error("environment variable {0} is not set")]
    MissingSecret(String),
    /// The reporter rejected its settings.
    #[error("incident reporter setup failed: {0}")]
    Reporter(#[from] IncidentError),
}

// ============================================================================
// SECTION: Selection
// ============================================================================

/// Builds the reporter for `incidents`.
///
/// # Errors
///
/// Returns [`BackendError`] when Instatus credentials are missing or the
/// reporter settings are invalid.
pub fn build_reporter(
    incidents: &IncidentsConfig,
    dry_run: bool,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SelectedReporter, BackendError> {
    if dry_run || incidents.backend == IncidentBackend::Log {
        return Ok(SelectedReporter {
            label: "log",
            reporter: Box::new(LogReporter::new(std::io::stderr())),
        });
    }
    let instatus = &incidents.instatus;
    let page_id = required_secret(&lookup, &instatus.page_id_env)?;
    let api_key = required_secret(&lookup, &instatus.api_key_env)?;
    let reporter = InstatusReporter::new(InstatusReporterConfig {
        base_url: instatus.base_url.clone(),
        page_id,
        api_key,
        timeout: Duration::from_millis(instatus.timeout_ms),
        notify: instatus.notify,
        allow_http: instatus.allow_http,
    })?;
    Ok(SelectedReporter {
        label: "instatus",
        reporter: Box::new(reporter),
    })
}

/// Looks up a non-empty credential.
fn required_secret(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<String, BackendError> {
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| BackendError::MissingSecret(name.to_string()))
}
