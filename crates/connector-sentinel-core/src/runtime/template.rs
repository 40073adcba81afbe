// crates/connector-sentinel-core/src/runtime/template.rs
// ============================================================================
// Module: Connector Sentinel Incident Templates
// Description: Fixed incident bodies for gateway and connector failures.
// Purpose: Render human-readable incident content without side effects.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Two template families exist: gateway unreachable, and connector
//! provisioning failed. Rendering is pure string construction.

use crate::core::IncidentBody;
use crate::core::TrackingId;

/// Title of the gateway-unreachable incident.
pub const GATEWAY_INCIDENT_TITLE: &str = "Verification SQL gateway unreachable";

/// Renders the gateway-unreachable incident body.
#[must_use]
pub fn render_gateway_template() -> IncidentBody {
    IncidentBody {
        title: GATEWAY_INCIDENT_TITLE.to_string(),
        message: "Scheduled integration checks cannot reach the cloud SQL gateway. \
                  Connector verification is paused until connectivity is restored."
            .to_string(),
    }
}

/// Renders the connector-provisioning-failed incident body.
///
/// `display_name` and `tracking_id` must be non-empty.
#[must_use]
pub fn render_connector_template(display_name: &str, tracking_id: &TrackingId) -> IncidentBody {
    debug_assert!(!display_name.is_empty(), "display name must be non-empty");
    debug_assert!(!tracking_id.as_str().is_empty(), "tracking id must be non-empty");
    IncidentBody {
        title: format!("{display_name} integration degraded"),
        message: format!(
            "Scheduled verification failed to provision a new {display_name} connector \
             through the cloud SQL gateway. Users may be unable to connect {display_name} \
             until the integration is fixed.\n\nReference: {tracking_id}"
        ),
    }
}
