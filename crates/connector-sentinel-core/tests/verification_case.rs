// crates/connector-sentinel-core/tests/verification_case.rs
// ============================================================================
// Module: Verification Case Tests
// Description: Phase ordering, escalation, and teardown behavior of a case.
// Purpose: Ensure one incident per failing phase and exactly-once teardown.
// ============================================================================

//! Verification case orchestration tests driven by in-memory fakes.

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
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::Mutex;

use connector_sentinel_core::CaseEnvironment;
use connector_sentinel_core::CaseError;
use connector_sentinel_core::CaseOutcome;
use connector_sentinel_core::CasePhase;
use connector_sentinel_core::CaseSettings;
use connector_sentinel_core::ConfigError;
use connector_sentinel_core::ConfigMapping;
use connector_sentinel_core::ConfigSource;
use connector_sentinel_core::ConnectFailure;
use connector_sentinel_core::ConnectionConfig;
use connector_sentinel_core::ConnectorDescriptor;
use connector_sentinel_core::ConnectorName;
use connector_sentinel_core::ConnectorType;
use connector_sentinel_core::FailureKind;
use connector_sentinel_core::GatewayConnection;
use connector_sentinel_core::GatewayConnector;
use connector_sentinel_core::GatewayCursor;
use connector_sentinel_core::GatewayError;
use connector_sentinel_core::GatewayStatus;
use connector_sentinel_core::IncidentAction;
use connector_sentinel_core::IncidentBody;
use connector_sentinel_core::IncidentError;
use connector_sentinel_core::IncidentKey;
use connector_sentinel_core::IncidentReceipt;
use connector_sentinel_core::IncidentReporter;
use connector_sentinel_core::InstanceName;
use connector_sentinel_core::NameGenerator;
use connector_sentinel_core::ProvisioningStatement;
use connector_sentinel_core::TargetKind;
use connector_sentinel_core::TrackingId;
use connector_sentinel_core::VerificationCase;
use serde_json::json;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

/// Ordered record of side effects across fakes.
type Events = Arc<Mutex<Vec<String>>>;

/// Tracking ID used for gateway incidents.
const GATEWAY_TRACKING: &str = "gateway-component";
/// Tracking ID of the connector under test.
const TWITTER_TRACKING: &str = "twitter-component";

/// Appends an event to the shared timeline.
fn push(events: &Events, event: impl Into<String>) {
    events.lock().unwrap().push(event.into());
}

/// Counts timeline events starting with `prefix`.
fn count(events: &Events, prefix: &str) -> usize {
    events.lock().unwrap().iter().filter(|event| event.starts_with(prefix)).count()
}

/// Scripted outcome of `connect`.
#[derive(Clone)]
enum ConnectBehavior {
    /// Connect cleanly.
    Succeed,
    /// Fail without a connection.
    Fail(GatewayError),
    /// Report database absent but hand back a connection.
    DegradedWithConnection,
    /// Fail with `error` while still handing back a connection.
    FailWithConnection(GatewayError),
}

/// Scripted gateway connector.
struct FakeGateway {
    /// Connect outcome.
    behavior: ConnectBehavior,
    /// Liveness reported by handed-out connections.
    alive: bool,
    /// Error returned by every execute, if any.
    execute_error: Option<GatewayError>,
    /// Shared timeline.
    events: Events,
}

impl FakeGateway {
    /// Creates a gateway with live connections and succeeding statements.
    fn new(behavior: ConnectBehavior, events: &Events) -> Self {
        Self {
            behavior,
            alive: true,
            execute_error: None,
            events: Arc::clone(events),
        }
    }

    /// Hands out connections that fail the liveness check.
    fn dead(mut self) -> Self {
        self.alive = false;
        self
    }

    /// Makes every statement fail with `error`.
    fn failing_execute(mut self, error: GatewayError) -> Self {
        self.execute_error = Some(error);
        self
    }

    /// Builds a connection sharing this gateway's script.
    fn connection(&self) -> Box<dyn GatewayConnection> {
        Box::new(FakeConnection {
            alive: self.alive,
            execute_error: self.execute_error.clone(),
            events: Arc::clone(&self.events),
        })
    }
}

impl GatewayConnector for FakeGateway {
    fn connect(
        &self,
        _config: &ConnectionConfig,
    ) -> Result<Box<dyn GatewayConnection>, ConnectFailure> {
        push(&self.events, "connect");
        match &self.behavior {
            ConnectBehavior::Succeed => Ok(self.connection()),
            ConnectBehavior::Fail(error) => Err(ConnectFailure::new(error.clone())),
            ConnectBehavior::DegradedWithConnection => Err(ConnectFailure::with_connection(
                GatewayError::DatabaseAbsent("unknown database 'mindsdb'".to_string()),
                self.connection(),
            )),
            ConnectBehavior::FailWithConnection(error) => {
                Err(ConnectFailure::with_connection(error.clone(), self.connection()))
            }
        }
    }
}

/// Connection handed out by [`FakeGateway`].
struct FakeConnection {
    /// Liveness result.
    alive: bool,
    /// Error returned by cursor execution.
    execute_error: Option<GatewayError>,
    /// Shared timeline.
    events: Events,
}

impl GatewayConnection for FakeConnection {
    fn is_alive(&mut self) -> bool {
        push(&self.events, "is_alive");
        self.alive
    }

    fn open_cursor(&mut self) -> Result<Box<dyn GatewayCursor + '_>, GatewayError> {
        push(&self.events, "cursor_open");
        Ok(Box::new(FakeCursor {
            execute_error: self.execute_error.clone(),
            events: Arc::clone(&self.events),
        }))
    }

    fn close(self: Box<Self>) -> Result<(), GatewayError> {
        push(&self.events, "close");
        Ok(())
    }
}

/// Cursor recording executed statements.
struct FakeCursor {
    /// Error returned by execution.
    execute_error: Option<GatewayError>,
    /// Shared timeline.
    events: Events,
}

impl GatewayCursor for FakeCursor {
    fn execute(&mut self, statement: ProvisioningStatement) -> Result<(), GatewayError> {
        push(&self.events, format!("execute:{}", statement.as_str()));
        self.execute_error.clone().map_or(Ok(()), Err)
    }

    fn close(self: Box<Self>) -> Result<(), GatewayError> {
        push(&self.events, "cursor_close");
        Ok(())
    }
}

/// Reporter that keeps one open incident per key, like the real service.
struct RecordingReporter {
    /// Fail every delivery.
    fail: bool,
    /// Open incident ids by key.
    open: Mutex<BTreeMap<IncidentKey, usize>>,
    /// Every report received.
    reports: Mutex<Vec<(IncidentKey, IncidentBody)>>,
    /// Shared timeline.
    events: Events,
}

impl RecordingReporter {
    /// Creates a reporter that accepts every report.
    fn new(events: &Events) -> Self {
        Self {
            fail: false,
            open: Mutex::new(BTreeMap::new()),
            reports: Mutex::new(Vec::new()),
            events: Arc::clone(events),
        }
    }

    /// Creates a reporter that rejects every report.
    fn failing(events: &Events) -> Self {
        Self {
            fail: true,
            ..Self::new(events)
        }
    }

    /// Returns every report received.
    fn reports(&self) -> Vec<(IncidentKey, IncidentBody)> {
        self.reports.lock().unwrap().clone()
    }

    /// Returns the number of open incidents.
    fn open_incidents(&self) -> usize {
        self.open.lock().unwrap().len()
    }
}

impl IncidentReporter for RecordingReporter {
    fn report(
        &self,
        key: &IncidentKey,
        body: &IncidentBody,
    ) -> Result<IncidentReceipt, IncidentError> {
        push(&self.events, format!("report:{key}"));
        self.reports.lock().unwrap().push((key.clone(), body.clone()));
        if self.fail {
            return Err(IncidentError::DeliveryFailed("status page offline".to_string()));
        }
        let mut open = self.open.lock().unwrap();
        let next_id = open.len() + 1;
        let action = if open.contains_key(key) {
            IncidentAction::Updated
        } else {
            open.insert(key.clone(), next_id);
            IncidentAction::Opened
        };
        let incident_id = format!("incident-{}", open[key]);
        drop(open);
        Ok(IncidentReceipt {
            key: key.clone(),
            incident_id,
            action,
        })
    }
}

/// Name generator with a fixed suffix.
struct FixedNames;

impl NameGenerator for FixedNames {
    fn generate(&self, prefix: &str) -> InstanceName {
        InstanceName::new(format!("{prefix}_fixed"))
    }
}

/// Name generator that panics mid-provisioning.
struct PanickingNames;

impl NameGenerator for PanickingNames {
    fn generate(&self, _prefix: &str) -> InstanceName {
        panic!("entropy source unavailable");
    }
}

/// In-memory config source keyed by bundle key.
struct MapSource {
    /// Bundles by key.
    documents: BTreeMap<String, ConfigMapping>,
}

impl ConfigSource for MapSource {
    fn resolve(&self, namespace: &str, key: &str) -> Result<ConfigMapping, ConfigError> {
        self.documents.get(key).cloned().ok_or_else(|| ConfigError::NotFound {
            namespace: namespace.to_string(),
            key: key.to_string(),
        })
    }
}

/// Converts a JSON object literal into a mapping.
fn mapping(value: serde_json::Value) -> ConfigMapping {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

/// Descriptor for the Twitter data source.
fn twitter() -> ConnectorDescriptor {
    ConnectorDescriptor {
        name: ConnectorName::new("twitter"),
        display_name: "Twitter".to_string(),
        target: TargetKind::Datasource,
        connector_type: ConnectorType::new("twitter"),
        config_key: Some("twitter".to_string()),
        instance_prefix: "twitter_datasource".to_string(),
        tracking_id: TrackingId::new(TWITTER_TRACKING),
    }
}

/// Case settings with a test gateway tracking ID.
fn settings() -> CaseSettings {
    CaseSettings {
        gateway_tracking_id: TrackingId::new(GATEWAY_TRACKING),
        ..CaseSettings::default()
    }
}

/// Config source holding valid gateway and Twitter bundles.
fn source() -> MapSource {
    let mut documents = BTreeMap::new();
    documents.insert(
        "mindsdb_cloud".to_string(),
        mapping(json!({"host": "cloud.example", "user": "u", "password": "p"})),
    );
    documents.insert("twitter".to_string(), mapping(json!({"api_key": "X"})));
    MapSource {
        documents,
    }
}

/// Prepares the Twitter case from valid config.
fn prepared_case() -> VerificationCase {
    VerificationCase::prepare(twitter(), &settings(), &source()).unwrap()
}

/// Bundles fakes into a case environment.
fn env<'a>(
    gateway: &'a FakeGateway,
    reporter: &'a RecordingReporter,
    names: &'a dyn NameGenerator,
) -> CaseEnvironment<'a> {
    CaseEnvironment {
        gateway,
        names,
        reporter,
    }
}

// ============================================================================
// SECTION: Happy Path
// ============================================================================

#[test]
fn passing_case_provisions_and_closes_once_without_incidents() {
    let events = Events::default();
    let gateway = FakeGateway::new(ConnectBehavior::Succeed, &events);
    let reporter = RecordingReporter::new(&events);

    let report = prepared_case().run(&env(&gateway, &reporter, &FixedNames));

    assert!(report.passed());
    assert_eq!(report.gateway, GatewayStatus::Connected);
    assert_eq!(report.instance_name, Some(InstanceName::new("twitter_datasource_fixed")));
    assert!(report.incidents.is_empty());
    assert!(report.connection_closed);
    assert!(reporter.reports().is_empty());
    assert_eq!(count(&events, "close"), 1);
    assert_eq!(count(&events, "execute:"), 1);
    assert_eq!(count(&events, "cursor_open"), count(&events, "cursor_close"));
}

#[test]
fn provisioning_statement_references_name_and_connector_type() {
    let events = Events::default();
    let gateway = FakeGateway::new(ConnectBehavior::Succeed, &events);
    let reporter = RecordingReporter::new(&events);

    let _ = prepared_case().run(&env(&gateway, &reporter, &FixedNames));

    let executed = events
        .lock()
        .unwrap()
        .iter()
        .find_map(|event| event.strip_prefix("execute:").map(str::to_string))
        .unwrap();
    assert!(executed.contains("twitter_datasource_fixed"));
    assert!(executed.contains("'twitter'"));
    assert!(executed.contains("\"api_key\":\"X\""));
}

// ============================================================================
// SECTION: Gateway Failures
// ============================================================================

#[test]
fn auth_denied_reports_gateway_incident_and_never_provisions() {
    let events = Events::default();
    let gateway = FakeGateway::new(
        ConnectBehavior::Fail(GatewayError::AuthDenied("access denied".to_string())),
        &events,
    );
    let reporter = RecordingReporter::new(&events);

    let report = prepared_case().run(&env(&gateway, &reporter, &FixedNames));

    assert_eq!(
        report.outcome,
        CaseOutcome::Failed {
            phase: CasePhase::Gateway,
            failure: FailureKind::GatewayAuthDenied,
        }
    );
    assert_eq!(report.gateway, GatewayStatus::Unreachable);
    assert_eq!(count(&events, "execute:"), 0);
    assert_eq!(count(&events, "cursor_open"), 0);
    assert_eq!(count(&events, "close"), 0);
    let reports = reporter.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].0, IncidentKey::new(GATEWAY_TRACKING));
    assert_eq!(report.incidents.len(), 1);
    assert!(report.incidents[0].delivered());
    assert!(report.instance_name.is_none());
}

#[test]
fn auth_denied_with_stray_connection_closes_it_and_never_provisions() {
    let events = Events::default();
    let gateway = FakeGateway::new(
        ConnectBehavior::FailWithConnection(GatewayError::AuthDenied("access denied".to_string())),
        &events,
    );
    let reporter = RecordingReporter::new(&events);

    let report = prepared_case().run(&env(&gateway, &reporter, &FixedNames));

    assert_eq!(
        report.outcome,
        CaseOutcome::Failed {
            phase: CasePhase::Gateway,
            failure: FailureKind::GatewayAuthDenied,
        }
    );
    assert_eq!(report.gateway, GatewayStatus::Unreachable);
    assert_eq!(count(&events, "close"), 1);
    assert_eq!(count(&events, "is_alive"), 0);
    assert_eq!(count(&events, "cursor_open"), 0);
    assert_eq!(count(&events, "execute:"), 0);
    let reports = reporter.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].0, IncidentKey::new(GATEWAY_TRACKING));
    assert_eq!(report.incidents.len(), 1);
    assert!(report.instance_name.is_none());
}

#[test]
fn other_connect_error_reports_gateway_incident() {
    let events = Events::default();
    let gateway = FakeGateway::new(
        ConnectBehavior::Fail(GatewayError::Other("connection refused".to_string())),
        &events,
    );
    let reporter = RecordingReporter::new(&events);

    let report = prepared_case().run(&env(&gateway, &reporter, &FixedNames));

    assert_eq!(
        report.outcome,
        CaseOutcome::Failed {
            phase: CasePhase::Gateway,
            failure: FailureKind::GatewayOtherError,
        }
    );
    assert_eq!(reporter.reports().len(), 1);
    assert_eq!(count(&events, "execute:"), 0);
}

#[test]
fn database_absent_without_connection_is_logged_not_escalated() {
    let events = Events::default();
    let gateway = FakeGateway::new(
        ConnectBehavior::Fail(GatewayError::DatabaseAbsent("unknown database".to_string())),
        &events,
    );
    let reporter = RecordingReporter::new(&events);

    let report = prepared_case().run(&env(&gateway, &reporter, &FixedNames));

    assert!(reporter.reports().is_empty());
    assert!(report.incidents.is_empty());
    assert_eq!(
        report.outcome,
        CaseOutcome::Failed {
            phase: CasePhase::Gateway,
            failure: FailureKind::GatewayDatabaseAbsent,
        }
    );
    assert_eq!(count(&events, "execute:"), 0);
}

#[test]
fn database_absent_with_connection_continues_degraded() {
    let events = Events::default();
    let gateway = FakeGateway::new(ConnectBehavior::DegradedWithConnection, &events);
    let reporter = RecordingReporter::new(&events);

    let report = prepared_case().run(&env(&gateway, &reporter, &FixedNames));

    assert!(report.passed());
    assert_eq!(report.gateway, GatewayStatus::Degraded);
    assert!(reporter.reports().is_empty());
    assert_eq!(count(&events, "execute:"), 1);
    assert_eq!(count(&events, "close"), 1);
}

#[test]
fn dead_connection_reports_gateway_incident_and_closes() {
    let events = Events::default();
    let gateway = FakeGateway::new(ConnectBehavior::Succeed, &events).dead();
    let reporter = RecordingReporter::new(&events);

    let report = prepared_case().run(&env(&gateway, &reporter, &FixedNames));

    assert_eq!(report.gateway, GatewayStatus::NotAlive);
    assert_eq!(
        report.outcome,
        CaseOutcome::Failed {
            phase: CasePhase::Gateway,
            failure: FailureKind::GatewayOtherError,
        }
    );
    assert_eq!(reporter.reports().len(), 1);
    assert_eq!(count(&events, "execute:"), 0);
    assert_eq!(count(&events, "close"), 1);
    assert!(report.connection_closed);
}

// ============================================================================
// SECTION: Provisioning Failures
// ============================================================================

#[test]
fn invalid_connector_config_reports_once_under_connector_key_then_closes() {
    let events = Events::default();
    let gateway = FakeGateway::new(ConnectBehavior::Succeed, &events)
        .failing_execute(GatewayError::Other("invalid api_key".to_string()));
    let reporter = RecordingReporter::new(&events);

    let report = prepared_case().run(&env(&gateway, &reporter, &FixedNames));

    assert_eq!(
        report.outcome,
        CaseOutcome::Failed {
            phase: CasePhase::Provisioning,
            failure: FailureKind::ConnectorProvisioningError,
        }
    );
    let reports = reporter.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].0, IncidentKey::new(TWITTER_TRACKING));
    assert!(reports[0].1.title.contains("Twitter"));
    assert!(reports[0].1.message.contains(TWITTER_TRACKING));
    assert_eq!(count(&events, "close"), 1);

    let timeline = events.lock().unwrap().clone();
    let reported_at = timeline.iter().position(|e| e.starts_with("report:")).unwrap();
    let closed_at = timeline.iter().position(|e| e == "close").unwrap();
    assert!(reported_at < closed_at, "connection closes after escalation");
}

#[test]
fn repeated_runs_with_same_key_keep_one_open_incident() {
    let events = Events::default();
    let gateway = FakeGateway::new(ConnectBehavior::Succeed, &events)
        .failing_execute(GatewayError::Other("invalid api_key".to_string()));
    let reporter = RecordingReporter::new(&events);
    let case = prepared_case();

    let first = case.run(&env(&gateway, &reporter, &FixedNames));
    let second = case.run(&env(&gateway, &reporter, &FixedNames));

    assert_eq!(reporter.open_incidents(), 1);
    let first_receipt = first.incidents[0].receipt.clone().unwrap();
    let second_receipt = second.incidents[0].receipt.clone().unwrap();
    assert_eq!(first_receipt.action, IncidentAction::Opened);
    assert_eq!(second_receipt.action, IncidentAction::Updated);
    assert_eq!(first_receipt.incident_id, second_receipt.incident_id);
}

#[test]
fn delivery_failure_keeps_original_outcome_observable() {
    let events = Events::default();
    let gateway = FakeGateway::new(ConnectBehavior::Succeed, &events)
        .failing_execute(GatewayError::Other("invalid api_key".to_string()));
    let reporter = RecordingReporter::failing(&events);

    let report = prepared_case().run(&env(&gateway, &reporter, &FixedNames));

    assert_eq!(
        report.outcome,
        CaseOutcome::Failed {
            phase: CasePhase::Provisioning,
            failure: FailureKind::ConnectorProvisioningError,
        }
    );
    assert_eq!(report.incidents.len(), 1);
    assert!(!report.incidents[0].delivered());
    assert_eq!(count(&events, "close"), 1);
}

#[test]
fn teardown_closes_connection_when_provisioning_unwinds() {
    let events = Events::default();
    let gateway = FakeGateway::new(ConnectBehavior::Succeed, &events);
    let reporter = RecordingReporter::new(&events);
    let case = prepared_case();

    let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
        case.run(&env(&gateway, &reporter, &PanickingNames))
    }));

    assert!(result.is_err());
    assert_eq!(count(&events, "close"), 1);
    assert_eq!(count(&events, "execute:"), 0);
}

// ============================================================================
// SECTION: Config Resolution
// ============================================================================

#[test]
fn missing_connector_config_fails_preparation_without_connecting() {
    let mut source = source();
    source.documents.remove("twitter");

    let result = VerificationCase::prepare(twitter(), &settings(), &source);

    match result {
        Err(err @ CaseError::Config {
            ..
        }) => {
            assert_eq!(err.failure_kind(), FailureKind::ConfigNotFound);
            assert!(err.to_string().contains("twitter"));
        }
        Ok(_) => panic!("expected config error"),
    }
}

#[test]
fn connector_without_config_key_uses_empty_mapping() {
    let mut descriptor = twitter();
    descriptor.config_key = None;
    descriptor.target = TargetKind::MlEngine;
    descriptor.connector_type = ConnectorType::new("huggingface");
    descriptor.instance_prefix = "hf_engine".to_string();
    let mut source = source();
    source.documents.remove("twitter");
    let events = Events::default();
    let gateway = FakeGateway::new(ConnectBehavior::Succeed, &events);
    let reporter = RecordingReporter::new(&events);

    let case = VerificationCase::prepare(descriptor, &settings(), &source).unwrap();
    let report = case.run(&env(&gateway, &reporter, &FixedNames));

    assert!(report.passed());
    let timeline = events.lock().unwrap().clone();
    assert!(timeline.contains(&"execute:CREATE ML_ENGINE hf_engine_fixed FROM huggingface;".to_string()));
}
