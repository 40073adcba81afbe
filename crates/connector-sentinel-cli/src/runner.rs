// crates/connector-sentinel-cli/src/runner.rs
// ============================================================================
// Module: Verification Batch Runner
// Description: Runs selected verification cases and summarizes the results.
// Purpose: Map case reports and config failures onto output and exit status.
// Dependencies: connector-sentinel-core, serde
// ============================================================================

//! ## Overview
//! Cases run sequentially in config order. A case whose config cannot be
//! resolved is recorded as a [`ConfigFailure`] and skipped; the remaining
//! cases still run. Config failures always fail the run. Failed cases only
//! fail the run in strict mode, since their outages are already escalated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write;

use connector_sentinel_core::CaseEnvironment;
use connector_sentinel_core::CaseError;
use connector_sentinel_core::CaseOutcome;
use connector_sentinel_core::CaseReport;
use connector_sentinel_core::CaseSettings;
use connector_sentinel_core::ConfigSource;
use connector_sentinel_core::ConnectorDescriptor;
use connector_sentinel_core::ConnectorName;
use connector_sentinel_core::FailureKind;
use connector_sentinel_core::VerificationCase;
use serde::Serialize;
use tracing::info;

// ============================================================================
// SECTION: Summary Types
// ============================================================================

/// A case that could not be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigFailure {
    /// Connector whose config failed.
    pub connector: ConnectorName,
    /// Failure classification.
    pub failure: FailureKind,
    /// Error message.
    pub message: String,
}

impl From<CaseError> for ConfigFailure {
    fn from(err: CaseError) -> Self {
        let failure = err.failure_kind();
        let message = err.to_string();
        match err {
            CaseError::Config {
                connector, ..
            } => Self {
                connector,
                failure,
                message,
            },
        }
    }
}

/// Results of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Reports of cases that ran, in run order.
    pub reports: Vec<CaseReport>,
    /// Cases skipped because their config failed.
    pub config_failures: Vec<ConfigFailure>,
}

impl RunSummary {
    /// Returns the number of cases that ran and failed.
    #[must_use]
    pub fn failed_cases(&self) -> usize {
        self.reports.iter().filter(|report| !report.passed()).count()
    }

    /// Returns true when the run should exit successfully.
    #[must_use]
    pub fn succeeded(&self, strict: bool) -> bool {
        self.config_failures.is_empty() && (!strict || self.failed_cases() == 0)
    }

    /// Renders one line per case plus a totals line.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut output = String::new();
        for report in &self.reports {
            output.push_str(&render_report_line(report));
            output.push('\n');
        }
        for failure in &self.config_failures {
            let _ = writeln!(
                output,
                "ERROR {} failure={} {}",
                failure.connector,
                failure.failure.as_str(),
                failure.message
            );
        }
        let _ = writeln!(
            output,
            "{} passed, {} failed, {} not run",
            self.reports.len() - self.failed_cases(),
            self.failed_cases(),
            self.config_failures.len()
        );
        output
    }
}

/// Renders a single case report as a text line.
#[must_use]
pub fn render_report_line(report: &CaseReport) -> String {
    let mut line = match report.outcome {
        CaseOutcome::Passed => format!("PASS {}", report.connector),
        CaseOutcome::Failed {
            phase,
            failure,
        } => format!(
            "FAIL {} phase={} failure={}",
            report.connector,
            phase.as_str(),
            failure.as_str()
        ),
    };
    let _ = write!(line, " gateway={}", report.gateway.as_str());
    if let Some(instance) = &report.instance_name {
        let _ = write!(line, " instance={instance}");
    }
    if !report.incidents.is_empty() {
        let delivered = report.incidents.iter().filter(|record| record.delivered()).count();
        let _ = write!(line, " incidents={} delivered={delivered}", report.incidents.len());
    }
    line
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Prepares and runs every case in `descriptors`.
#[must_use]
pub fn run_cases(
    descriptors: Vec<ConnectorDescriptor>,
    settings: &CaseSettings,
    source: &dyn ConfigSource,
    env: &CaseEnvironment<'_>,
) -> RunSummary {
    let mut summary = RunSummary::default();
    for descriptor in descriptors {
        match VerificationCase::prepare(descriptor, settings, source) {
            Ok(case) => {
                let report = case.run(env);
                info!(
                    connector = %report.connector,
                    passed = report.passed(),
                    gateway = report.gateway.as_str(),
                    "verification case finished"
                );
                summary.reports.push(report);
            }
            Err(err) => summary.config_failures.push(ConfigFailure::from(err)),
        }
    }
    summary
}
