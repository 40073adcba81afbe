// crates/connector-sentinel-core/src/core/failure.rs
// ============================================================================
// Module: Connector Sentinel Failure Taxonomy
// Description: Closed classification of every failure the harness observes.
// Purpose: Provide stable labels for logs and reports.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`FailureKind`] is the single taxonomy shared by logs, case reports, and
//! the CLI summary. Boundary-specific error enums map into it.

use serde::Deserialize;
use serde::Serialize;

/// Classification of a verification failure.
///
/// # Invariants
/// - Variants and labels are stable for telemetry and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Gateway rejected the credentials.
    GatewayAuthDenied,
    /// Gateway reported that the target database does not exist.
    GatewayDatabaseAbsent,
    /// Any other gateway failure (network, protocol, liveness).
    GatewayOtherError,
    /// Provisioning statement failed to execute.
    ConnectorProvisioningError,
    /// Config namespace or key was absent.
    ConfigNotFound,
    /// Config document did not parse or had the wrong shape.
    MalformedConfig,
    /// Incident service did not accept the report.
    IncidentDeliveryFailed,
}

impl FailureKind {
    /// Returns a stable label for the failure kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GatewayAuthDenied => "gateway_auth_denied",
            Self::GatewayDatabaseAbsent => "gateway_database_absent",
            Self::GatewayOtherError => "gateway_other_error",
            Self::ConnectorProvisioningError => "connector_provisioning_error",
            Self::ConfigNotFound => "config_not_found",
            Self::MalformedConfig => "malformed_config",
            Self::IncidentDeliveryFailed => "incident_delivery_failed",
        }
    }
}
