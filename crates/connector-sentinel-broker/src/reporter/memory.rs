// crates/connector-sentinel-broker/src/reporter/memory.rs
// ============================================================================
// Module: Connector Sentinel Memory Reporter
// Description: In-memory incident reporter.
// Purpose: Capture deliveries for inspection by callers and tests.
// Dependencies: connector-sentinel-core
// ============================================================================

//! ## Overview
//! `MemoryReporter` records every delivery in order and keeps one open
//! incident per key, mirroring the status page's deduplication.

use std::sync::Mutex;

use connector_sentinel_core::IncidentBody;
use connector_sentinel_core::IncidentError;
use connector_sentinel_core::IncidentKey;
use connector_sentinel_core::IncidentReceipt;
use connector_sentinel_core::IncidentReporter;

use crate::reporter::IncidentLedger;

/// One delivered report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredIncident {
    /// Body that was reported.
    pub body: IncidentBody,
    /// Receipt returned to the caller.
    pub receipt: IncidentReceipt,
}

/// In-memory incident reporter.
#[derive(Debug)]
pub struct MemoryReporter {
    /// Deliveries in order.
    deliveries: Mutex<Vec<DeliveredIncident>>,
    /// Open incidents by key.
    ledger: IncidentLedger,
}

impl Default for MemoryReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryReporter {
    /// Creates an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            deliveries: Mutex::new(Vec::new()),
            ledger: IncidentLedger::new("memory"),
        }
    }

    /// Returns every delivery so far.
    #[must_use]
    pub fn deliveries(&self) -> Vec<DeliveredIncident> {
        self.deliveries.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// Returns the number of open incidents.
    #[must_use]
    pub fn open_incidents(&self) -> usize {
        self.ledger.open_count()
    }
}

impl IncidentReporter for MemoryReporter {
    fn report(
        &self,
        key: &IncidentKey,
        body: &IncidentBody,
    ) -> Result<IncidentReceipt, IncidentError> {
        let mut deliveries = self
            .deliveries
            .lock()
            .map_err(|_| IncidentError::DeliveryFailed("memory reporter poisoned".to_string()))?;
        let receipt = self.ledger.record_with(key, |receipt| {
            deliveries.push(DeliveredIncident {
                body: body.clone(),
                receipt: receipt.clone(),
            });
            Ok(())
        })?;
        drop(deliveries);
        Ok(receipt)
    }
}
