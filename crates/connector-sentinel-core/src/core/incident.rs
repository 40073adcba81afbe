// crates/connector-sentinel-core/src/core/incident.rs
// ============================================================================
// Module: Connector Sentinel Incidents
// Description: Incident bodies and delivery receipts.
// Purpose: Describe what is escalated and what the incident service did with it.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`IncidentBody`] values are rendered fresh on every failure and always
//! travel with an [`IncidentKey`]. Reporters answer with an
//! [`IncidentReceipt`] that records whether the key opened a new incident or
//! updated the one already open.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::IncidentKey;

// ============================================================================
// SECTION: Incident Body
// ============================================================================

/// Rendered, human-readable incident content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentBody {
    /// Short incident title.
    pub title: String,
    /// Incident message body.
    pub message: String,
}

// ============================================================================
// SECTION: Incident Receipt
// ============================================================================

/// What the incident service did with a report.
///
/// # Invariants
/// - Variants are stable for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentAction {
    /// No open incident existed for the key; a new one was opened.
    Opened,
    /// An open incident existed for the key and was updated.
    Updated,
}

impl IncidentAction {
    /// Returns a stable label for the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Updated => "updated",
        }
    }
}

/// Receipt returned after a successful incident delivery.
///
/// # Invariants
/// - Returned only after the incident service acknowledged the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentReceipt {
    /// Key the report was filed under.
    pub key: IncidentKey,
    /// Incident identifier assigned by the service.
    pub incident_id: String,
    /// Whether the report opened or updated an incident.
    pub action: IncidentAction,
}
