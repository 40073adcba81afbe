// crates/connector-sentinel-broker/src/reporter/log.rs
// ============================================================================
// Module: Connector Sentinel Log Reporter
// Description: JSON-lines incident reporter.
// Purpose: Record incidents locally without contacting a status page.
// Dependencies: serde_json, std
// ============================================================================

//! ## Overview
//! `LogReporter` writes one JSON record per report and returns the receipt.
//! Deduplication is in-process: the first report for a key opens an incident,
//! later reports for the same key update it. A failed write leaves the key
//! unopened.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;

use connector_sentinel_core::IncidentBody;
use connector_sentinel_core::IncidentError;
use connector_sentinel_core::IncidentKey;
use connector_sentinel_core::IncidentReceipt;
use connector_sentinel_core::IncidentReporter;
use serde_json::json;

use crate::reporter::IncidentLedger;

// ============================================================================
// SECTION: Log Reporter
// ============================================================================

/// JSON-lines incident reporter.
pub struct LogReporter<W: Write + Send> {
    /// Output writer for incident records.
    writer: Mutex<W>,
    /// Open incidents by key.
    ledger: IncidentLedger,
}

impl<W: Write + Send> LogReporter<W> {
    /// Creates a log reporter writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            ledger: IncidentLedger::new("log"),
        }
    }

    /// Consumes the reporter and returns the writer.
    ///
    /// # Errors
    ///
    /// Returns [`IncidentError::DeliveryFailed`] when the writer mutex is poisoned.
    pub fn into_inner(self) -> Result<W, IncidentError> {
        self.writer
            .into_inner()
            .map_err(|_| IncidentError::DeliveryFailed("log writer mutex poisoned".to_string()))
    }
}

impl<W: Write + Send> IncidentReporter for LogReporter<W> {
    fn report(
        &self,
        key: &IncidentKey,
        body: &IncidentBody,
    ) -> Result<IncidentReceipt, IncidentError> {
        let mut guard = self
            .writer
            .lock()
            .map_err(|_| IncidentError::DeliveryFailed("log writer mutex poisoned".to_string()))?;
        let receipt = self.ledger.record_with(key, |receipt| {
            let record = json!({
                "action": receipt.action.as_str(),
                "incident_id": receipt.incident_id,
                "key": key,
                "title": body.title,
                "message": body.message,
            });
            serde_json::to_writer(&mut *guard, &record)
                .map_err(|err| IncidentError::DeliveryFailed(err.to_string()))?;
            guard.write_all(b"\n").map_err(|err| IncidentError::DeliveryFailed(err.to_string()))?;
            guard.flush().map_err(|err| IncidentError::DeliveryFailed(err.to_string()))
        })?;
        drop(guard);
        Ok(receipt)
    }
}
