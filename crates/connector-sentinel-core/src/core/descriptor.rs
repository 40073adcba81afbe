// crates/connector-sentinel-core/src/core/descriptor.rs
// ============================================================================
// Module: Connector Sentinel Descriptors
// Description: Connector identity used to parameterize a verification case.
// Purpose: Replace per-connector duplicated checks with one descriptor type.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`ConnectorDescriptor`] carries everything that differs between
//! verification cases: what to provision, where its credentials live, and
//! which tracking ID to escalate under.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ConnectorName;
use crate::core::identifiers::ConnectorType;
use crate::core::identifiers::IncidentKey;
use crate::core::identifiers::TrackingId;

// ============================================================================
// SECTION: Target Kind
// ============================================================================

/// Kind of gateway object a connector provisions.
///
/// # Invariants
/// - Variants are stable for configuration and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// External data source (`CREATE DATABASE`).
    Datasource,
    /// Machine learning engine (`CREATE ML_ENGINE`).
    MlEngine,
}

impl TargetKind {
    /// Returns a stable label for the target kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Datasource => "datasource",
            Self::MlEngine => "ml_engine",
        }
    }
}

// ============================================================================
// SECTION: Connector Descriptor
// ============================================================================

/// Identity and routing data for one connector verification case.
///
/// # Invariants
/// - `config_key = None` means the connector needs no credentials.
/// - `tracking_id` is distinct per connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorDescriptor {
    /// Stable case name.
    pub name: ConnectorName,
    /// Human-readable connector name used in incident bodies.
    pub display_name: String,
    /// Kind of object to provision.
    pub target: TargetKind,
    /// Engine type passed to the gateway.
    pub connector_type: ConnectorType,
    /// Key of the connector's credential bundle, if any.
    #[serde(default)]
    pub config_key: Option<String>,
    /// Prefix for generated instance names.
    pub instance_prefix: String,
    /// Tracking ID for provisioning incidents.
    pub tracking_id: TrackingId,
}

impl ConnectorDescriptor {
    /// Returns the incident key used for this connector's provisioning failures.
    #[must_use]
    pub fn incident_key(&self) -> IncidentKey {
        IncidentKey::from(&self.tracking_id)
    }
}
