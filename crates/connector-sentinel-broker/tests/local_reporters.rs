// crates/connector-sentinel-broker/tests/local_reporters.rs
// ============================================================================
// Module: Local Reporter Tests
// Description: Tests for the JSON-lines log reporter and memory reporter.
// Purpose: Validate deduplication, record format, and write failures.
// Dependencies: connector-sentinel-broker, serde_json
// ============================================================================

//! ## Overview
//! Exercises [`connector_sentinel_broker::LogReporter`] and
//! [`connector_sentinel_broker::MemoryReporter`].

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::io;
use std::io::Write;

use connector_sentinel_broker::LogReporter;
use connector_sentinel_broker::MemoryReporter;
use connector_sentinel_core::IncidentAction;
use connector_sentinel_core::IncidentBody;
use connector_sentinel_core::IncidentError;
use connector_sentinel_core::IncidentKey;
use connector_sentinel_core::IncidentReporter;
use serde_json::Value;

/// Writer that always fails.
struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer that fails its first write and accepts the rest.
#[derive(Default)]
struct FlakyWriter {
    /// Whether the first write has already failed.
    failed_once: bool,
    /// Bytes accepted so far.
    written: Vec<u8>,
}

impl Write for FlakyWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.failed_once {
            self.failed_once = true;
            return Err(io::Error::other("disk full"));
        }
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sample incident body.
fn body(title: &str) -> IncidentBody {
    IncidentBody {
        title: title.to_string(),
        message: "details".to_string(),
    }
}

// ============================================================================
// SECTION: Log Reporter
// ============================================================================

#[test]
fn log_reporter_writes_one_json_line_per_report() {
    let reporter = LogReporter::new(Vec::new());
    let key = IncidentKey::new("component-a");

    let first = reporter.report(&key, &body("Twitter integration degraded")).unwrap();
    let second = reporter.report(&key, &body("Twitter integration degraded")).unwrap();

    assert_eq!(first.action, IncidentAction::Opened);
    assert_eq!(second.action, IncidentAction::Updated);
    assert_eq!(first.incident_id, second.incident_id);
    assert!(first.incident_id.starts_with("log-"));

    let output = String::from_utf8(reporter.into_inner().unwrap()).unwrap();
    let records: Vec<Value> =
        output.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["action"], "opened");
    assert_eq!(records[1]["action"], "updated");
    assert_eq!(records[0]["key"], "component-a");
    assert_eq!(records[0]["title"], "Twitter integration degraded");
}

#[test]
fn log_reporter_opens_separate_incidents_per_key() {
    let reporter = LogReporter::new(Vec::new());

    let gateway = reporter.report(&IncidentKey::new("gateway"), &body("gateway")).unwrap();
    let connector = reporter.report(&IncidentKey::new("connector"), &body("connector")).unwrap();

    assert_eq!(gateway.action, IncidentAction::Opened);
    assert_eq!(connector.action, IncidentAction::Opened);
    assert_ne!(gateway.incident_id, connector.incident_id);
}

#[test]
fn log_reporter_write_failure_is_delivery_failure() {
    let reporter = LogReporter::new(FailingWriter);

    let err = reporter.report(&IncidentKey::new("k"), &body("t")).unwrap_err();

    assert!(matches!(err, IncidentError::DeliveryFailed(_)));
    assert!(err.to_string().contains("disk full"));
}

#[test]
fn log_reporter_failed_write_does_not_open_incident() {
    let reporter = LogReporter::new(FlakyWriter::default());
    let key = IncidentKey::new("k");

    let first = reporter.report(&key, &body("t"));
    let second = reporter.report(&key, &body("t")).unwrap();

    assert!(matches!(first, Err(IncidentError::DeliveryFailed(_))));
    assert_eq!(second.action, IncidentAction::Opened);
    assert_eq!(second.incident_id, "log-1");

    let writer = reporter.into_inner().unwrap();
    let output = String::from_utf8(writer.written).unwrap();
    let records: Vec<Value> =
        output.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["action"], "opened");
    assert_eq!(records[0]["incident_id"], "log-1");
}

// ============================================================================
// SECTION: Memory Reporter
// ============================================================================

#[test]
fn memory_reporter_records_deliveries_and_dedups() {
    let reporter = MemoryReporter::new();
    let key = IncidentKey::new("component-b");

    reporter.report(&key, &body("first")).unwrap();
    reporter.report(&key, &body("second")).unwrap();
    reporter.report(&IncidentKey::new("component-c"), &body("third")).unwrap();

    let deliveries = reporter.deliveries();
    assert_eq!(deliveries.len(), 3);
    assert_eq!(deliveries[1].body.title, "second");
    assert_eq!(deliveries[1].receipt.action, IncidentAction::Updated);
    assert_eq!(reporter.open_incidents(), 2);
}
