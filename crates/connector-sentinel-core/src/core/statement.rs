// crates/connector-sentinel-core/src/core/statement.rs
// ============================================================================
// Module: Connector Sentinel Provisioning Statement
// Description: Opaque statement text issued to the gateway.
// Purpose: Make single-use statement execution explicit in the type system.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A [`ProvisioningStatement`] is produced by the query builder and consumed
//! once by a gateway cursor. Statement text embeds credentials, so `Debug`
//! prints only its length.

use std::fmt;

/// Text command instructing the gateway to create a connector instance.
///
/// # Invariants
/// - Text is never logged; it carries connector credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct ProvisioningStatement {
    /// Statement text.
    text: String,
}

impl ProvisioningStatement {
    /// Wraps rendered statement text.
    #[must_use]
    pub const fn new(text: String) -> Self {
        Self {
            text,
        }
    }

    /// Returns the statement text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consumes the statement and returns its text.
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }
}

impl fmt::Debug for ProvisioningStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisioningStatement").field("len", &self.text.len()).finish()
    }
}
