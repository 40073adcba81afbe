// crates/connector-sentinel-broker/src/reporter/mod.rs
// ============================================================================
// Module: Connector Sentinel Incident Reporters
// Description: Reference incident reporter implementations.
// Purpose: Deliver incident reports and return receipts.
// Dependencies: connector-sentinel-core
// ============================================================================

//! ## Overview
//! Reporters deliver [`IncidentBody`] values under an [`IncidentKey`] and
//! return [`IncidentReceipt`] values. Every reporter keeps at most one open
//! incident per key: a repeat report updates the open incident.
//! Invariants:
//! - Receipts are returned only after successful delivery.
//!
//! [`IncidentBody`]: connector_sentinel_core::IncidentBody

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Mutex;

use connector_sentinel_core::IncidentAction;
use connector_sentinel_core::IncidentError;
use connector_sentinel_core::IncidentKey;
use connector_sentinel_core::IncidentReceipt;

// ============================================================================
// SECTION: Incident Ledger
// ============================================================================

/// In-process record of open incidents for reporters without a remote store.
#[derive(Debug)]
pub(crate) struct IncidentLedger {
    /// Prefix embedded in generated incident IDs.
    prefix: String,
    /// Open incident IDs by key, plus the last issued sequence number.
    state: Mutex<(BTreeMap<IncidentKey, String>, u64)>,
}

impl IncidentLedger {
    /// Creates an empty ledger issuing IDs with `prefix`.
    pub(crate) fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            state: Mutex::new((BTreeMap::new(), 0)),
        }
    }

    /// Opens an incident for `key`, or updates the one already open.
    ///
    /// `deliver` runs with the ledger locked and receives the receipt the
    /// report would produce. The ledger only changes when it succeeds.
    pub(crate) fn record_with(
        &self,
        key: &IncidentKey,
        deliver: impl FnOnce(&IncidentReceipt) -> Result<(), IncidentError>,
    ) -> Result<IncidentReceipt, IncidentError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| IncidentError::DeliveryFailed("incident ledger poisoned".to_string()))?;
        let (open, sequence) = &mut *guard;
        let receipt = match open.get(key) {
            Some(incident_id) => IncidentReceipt {
                key: key.clone(),
                incident_id: incident_id.clone(),
                action: IncidentAction::Updated,
            },
            None => IncidentReceipt {
                key: key.clone(),
                incident_id: format!("{}-{}", self.prefix, *sequence + 1),
                action: IncidentAction::Opened,
            },
        };
        deliver(&receipt)?;
        if receipt.action == IncidentAction::Opened {
            *sequence += 1;
            open.insert(key.clone(), receipt.incident_id.clone());
        }
        drop(guard);
        Ok(receipt)
    }

    /// Returns the number of open incidents.
    pub(crate) fn open_count(&self) -> usize {
        self.state.lock().map_or(0, |guard| guard.0.len())
    }
}

// ============================================================================
// SECTION: Implementations
// ============================================================================

pub mod instatus;
pub mod log;
pub mod memory;

pub use instatus::InstatusReporter;
pub use instatus::InstatusReporterConfig;
pub use log::LogReporter;
pub use memory::DeliveredIncident;
pub use memory::MemoryReporter;
