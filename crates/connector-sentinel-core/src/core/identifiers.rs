// crates/connector-sentinel-core/src/core/identifiers.rs
// ============================================================================
// Module: Connector Sentinel Identifiers
// Description: Opaque identifiers for connectors, instances, and incidents.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers are opaque UTF-8 strings that serialize transparently. They
//! exist so that incident keys, tracking IDs, and connector names cannot be
//! swapped by accident at the orchestrator boundary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Macro
// ============================================================================

/// Declares an opaque string identifier with the shared trait surface.
macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

string_identifier! {
    /// Short, stable name of a verification case (for example `twitter`).
    ///
    /// # Invariants
    /// - Unique within a connector catalog.
    ConnectorName
}

string_identifier! {
    /// Connector engine type understood by the gateway (for example `aurora`).
    ///
    /// # Invariants
    /// - Opaque UTF-8 string; interpolated into statements without escaping.
    ConnectorType
}

string_identifier! {
    /// Generated name of an ephemeral connector instance.
    ///
    /// # Invariants
    /// - Produced by a [`crate::NameGenerator`]; unique per invocation in practice.
    InstanceName
}

string_identifier! {
    /// Hand-assigned tracking identifier for a failure category.
    ///
    /// # Invariants
    /// - One shared value for the gateway, one distinct value per connector.
    TrackingId
}

string_identifier! {
    /// Deduplication identity used at the incident reporter boundary.
    ///
    /// # Invariants
    /// - Two reports with the same key collapse into one open incident.
    IncidentKey
}

impl From<&TrackingId> for IncidentKey {
    fn from(value: &TrackingId) -> Self {
        Self::new(value.as_str())
    }
}
