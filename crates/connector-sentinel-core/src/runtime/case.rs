// crates/connector-sentinel-core/src/runtime/case.rs
// ============================================================================
// Module: Connector Sentinel Verification Case
// Description: Connect, verify, and provision orchestration for one connector.
// Purpose: Convert gateway and provisioning failures into deduplicated incidents.
// Dependencies: crate::{core, interfaces}, serde, thiserror, tracing
// ============================================================================

//! ## Overview
//! A [`VerificationCase`] runs three phases against the SQL gateway and is
//! terminal after one pass:
//! 1. connect (auth denied or other errors escalate under the gateway key;
//!    database absent is logged only and continues when a connection exists),
//! 2. liveness check (a dead connection escalates under the gateway key),
//! 3. provision (an execution error escalates under the connector key).
//!
//! Invariants:
//! - At most one incident is reported per phase per run.
//! - No statement executes without a connection from phase 1.
//! - An opened connection is closed exactly once, including on unwind.
//!
//! Config bundles are resolved before construction ([`VerificationCase::prepare`]);
//! resolution failures are returned as [`CaseError`] and never escalated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Display;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::core::ConnectionConfig;
use crate::core::ConnectorConfig;
use crate::core::ConnectorDescriptor;
use crate::core::ConnectorName;
use crate::core::FailureKind;
use crate::core::IncidentBody;
use crate::core::IncidentKey;
use crate::core::IncidentReceipt;
use crate::core::InstanceName;
use crate::core::ProvisioningStatement;
use crate::core::TrackingId;
use crate::interfaces::ConfigError;
use crate::interfaces::ConfigSource;
use crate::interfaces::GatewayConnection;
use crate::interfaces::GatewayConnector;
use crate::interfaces::GatewayError;
use crate::interfaces::IncidentReporter;
use crate::interfaces::NameGenerator;
use crate::runtime::query::QueryBuilder;
use crate::runtime::template::render_connector_template;
use crate::runtime::template::render_gateway_template;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default environment variable holding the config JSON document.
pub const DEFAULT_CONFIG_NAMESPACE: &str = "INTEGRATIONS_CONFIG";
/// Default key of the gateway connection bundle.
pub const DEFAULT_GATEWAY_CONFIG_KEY: &str = "mindsdb_cloud";
/// Default tracking ID shared by all gateway-unreachable incidents.
pub const DEFAULT_GATEWAY_TRACKING_ID: &str = "cl8nll9f7106187olof1m17eg17";

// ============================================================================
// SECTION: Settings and Config
// ============================================================================

/// Settings shared by every verification case in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSettings {
    /// Namespace holding all config bundles.
    pub config_namespace: String,
    /// Key of the gateway connection bundle.
    pub gateway_config_key: String,
    /// Tracking ID for gateway incidents.
    pub gateway_tracking_id: TrackingId,
}

impl Default for CaseSettings {
    fn default() -> Self {
        Self {
            config_namespace: DEFAULT_CONFIG_NAMESPACE.to_string(),
            gateway_config_key: DEFAULT_GATEWAY_CONFIG_KEY.to_string(),
            gateway_tracking_id: TrackingId::new(DEFAULT_GATEWAY_TRACKING_ID),
        }
    }
}

/// Resolved config bundles owned by one verification case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseConfig {
    /// Gateway connection parameters.
    pub gateway: ConnectionConfig,
    /// Connector parameters (empty when the connector needs none).
    pub connector: ConnectorConfig,
}

impl CaseConfig {
    /// Resolves both bundles for a connector.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when either bundle is absent or malformed.
    pub fn resolve(
        source: &dyn ConfigSource,
        settings: &CaseSettings,
        descriptor: &ConnectorDescriptor,
    ) -> Result<Self, ConfigError> {
        let gateway = ConnectionConfig::from_mapping(
            source.resolve(&settings.config_namespace, &settings.gateway_config_key)?,
        )?;
        let connector = match &descriptor.config_key {
            Some(key) => {
                ConnectorConfig::from_mapping(source.resolve(&settings.config_namespace, key)?)
            }
            None => ConnectorConfig::empty(),
        };
        Ok(Self {
            gateway,
            connector,
        })
    }
}

/// Errors that prevent a verification case from being constructed.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum CaseError {
    /// Config resolution failed.
    #[error("config resolution failed for {connector}: {source}")]
    Config {
        /// Connector whose config could not be resolved.
        connector: ConnectorName,
        /// Underlying config error.
        source: ConfigError,
    },
}

impl CaseError {
    /// Returns the failure classification for this error.
    #[must_use]
    pub const fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Config {
                source, ..
            } => source.failure_kind(),
        }
    }
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Verification phase that escalated or failed.
///
/// # Invariants
/// - Variants are stable for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CasePhase {
    /// Connect and liveness phases.
    Gateway,
    /// Provisioning phase.
    Provisioning,
}

impl CasePhase {
    /// Returns a stable label for the phase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gateway => "gateway",
            Self::Provisioning => "provisioning",
        }
    }
}

/// Gateway state reached by a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayStatus {
    /// Connected and alive.
    Connected,
    /// Database absent but a connection was still obtained.
    Degraded,
    /// No connection could be obtained.
    Unreachable,
    /// Connected but the liveness check failed.
    NotAlive,
}

impl GatewayStatus {
    /// Returns a stable label for the gateway state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Degraded => "degraded",
            Self::Unreachable => "unreachable",
            Self::NotAlive => "not_alive",
        }
    }
}

/// Terminal outcome of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaseOutcome {
    /// The connector was provisioned.
    Passed,
    /// The case stopped in `phase`.
    Failed {
        /// Phase that failed.
        phase: CasePhase,
        /// Failure classification.
        failure: FailureKind,
    },
}

/// One escalation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentRecord {
    /// Phase that escalated.
    pub phase: CasePhase,
    /// Key the report was filed under.
    pub key: IncidentKey,
    /// Failure that triggered the report.
    pub failure: FailureKind,
    /// Receipt when delivery succeeded.
    pub receipt: Option<IncidentReceipt>,
}

impl IncidentRecord {
    /// Returns true when the incident service acknowledged the report.
    #[must_use]
    pub const fn delivered(&self) -> bool {
        self.receipt.is_some()
    }
}

/// Result of one verification case run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseReport {
    /// Connector that was verified.
    pub connector: ConnectorName,
    /// Gateway state reached.
    pub gateway: GatewayStatus,
    /// Terminal outcome.
    pub outcome: CaseOutcome,
    /// Generated instance name, when provisioning was attempted.
    pub instance_name: Option<InstanceName>,
    /// Escalations in the order they happened.
    pub incidents: Vec<IncidentRecord>,
    /// Whether an opened connection was closed cleanly.
    pub connection_closed: bool,
}

impl CaseReport {
    /// Returns true when the case passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self.outcome, CaseOutcome::Passed)
    }
}

// ============================================================================
// SECTION: Verification Case
// ============================================================================

/// Collaborators used while a case runs.
#[derive(Clone, Copy)]
pub struct CaseEnvironment<'a> {
    /// Gateway connector.
    pub gateway: &'a dyn GatewayConnector,
    /// Instance name generator.
    pub names: &'a dyn NameGenerator,
    /// Incident reporter.
    pub reporter: &'a dyn IncidentReporter,
}

/// Three-phase verification of one connector.
#[derive(Debug, Clone)]
pub struct VerificationCase {
    /// Connector under verification.
    descriptor: ConnectorDescriptor,
    /// Resolved config bundles.
    config: CaseConfig,
    /// Key for gateway incidents.
    gateway_key: IncidentKey,
}

impl VerificationCase {
    /// Creates a case from already-resolved config.
    #[must_use]
    pub fn new(
        descriptor: ConnectorDescriptor,
        config: CaseConfig,
        gateway_tracking_id: &TrackingId,
    ) -> Self {
        Self {
            descriptor,
            config,
            gateway_key: IncidentKey::from(gateway_tracking_id),
        }
    }

    /// Resolves config for `descriptor` and builds the case.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError::Config`] when config resolution fails.
    pub fn prepare(
        descriptor: ConnectorDescriptor,
        settings: &CaseSettings,
        source: &dyn ConfigSource,
    ) -> Result<Self, CaseError> {
        match CaseConfig::resolve(source, settings, &descriptor) {
            Ok(config) => Ok(Self::new(descriptor, config, &settings.gateway_tracking_id)),
            Err(err) => {
                error!(
                    connector = %descriptor.name,
                    failure = err.failure_kind().as_str(),
                    error = %err,
                    "config resolution failed"
                );
                Err(CaseError::Config {
                    connector: descriptor.name,
                    source: err,
                })
            }
        }
    }

    /// Returns the connector descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &ConnectorDescriptor {
        &self.descriptor
    }

    /// Runs all phases once and returns the report.
    #[must_use]
    pub fn run(&self, env: &CaseEnvironment<'_>) -> CaseReport {
        let connector = &self.descriptor.name;
        let mut escalation = Escalation::new(env.reporter, connector);

        // Phase 1: connect.
        let (connection, gateway) = match env.gateway.connect(&self.config.gateway) {
            Ok(connection) => {
                info!(connector = %connector, "gateway connected");
                (connection, GatewayStatus::Connected)
            }
            Err(failure) => {
                let kind = failure.error.failure_kind();
                match (failure.error, failure.connection) {
                    (GatewayError::DatabaseAbsent(message), Some(connection)) => {
                        warn!(
                            connector = %connector,
                            failure = kind.as_str(),
                            error = %message,
                            "gateway database absent; continuing on fallback connection"
                        );
                        (connection, GatewayStatus::Degraded)
                    }
                    (GatewayError::DatabaseAbsent(message), None) => {
                        warn!(
                            connector = %connector,
                            failure = kind.as_str(),
                            error = %message,
                            "gateway database absent; provisioning skipped"
                        );
                        return self.finish_without_connection(escalation, kind);
                    }
                    (error, stray) => {
                        if let Some(stray) = stray {
                            ConnectionGuard::new(connector, stray).close();
                        }
                        escalation.escalate(
                            CasePhase::Gateway,
                            &self.gateway_key,
                            &render_gateway_template(),
                            kind,
                            &error,
                        );
                        return self.finish_without_connection(escalation, kind);
                    }
                }
            }
        };
        let mut guard = ConnectionGuard::new(connector, connection);

        // Phase 2: liveness.
        if !guard.is_alive() {
            let kind = FailureKind::GatewayOtherError;
            escalation.escalate(
                CasePhase::Gateway,
                &self.gateway_key,
                &render_gateway_template(),
                kind,
                &"connection not alive after connect",
            );
            return CaseReport {
                connector: connector.clone(),
                gateway: GatewayStatus::NotAlive,
                outcome: CaseOutcome::Failed {
                    phase: CasePhase::Gateway,
                    failure: kind,
                },
                instance_name: None,
                incidents: escalation.into_records(),
                connection_closed: guard.close(),
            };
        }

        // Phase 3: provision.
        let instance_name = env.names.generate(&self.descriptor.instance_prefix);
        let statement = QueryBuilder::build(
            self.descriptor.target,
            &instance_name,
            &self.descriptor.connector_type,
            &self.config.connector,
        );
        let outcome = match guard.execute(statement) {
            Ok(()) => {
                info!(connector = %connector, instance = %instance_name, "connector provisioned");
                CaseOutcome::Passed
            }
            Err(err) => {
                let kind = FailureKind::ConnectorProvisioningError;
                let body = render_connector_template(
                    &self.descriptor.display_name,
                    &self.descriptor.tracking_id,
                );
                escalation.escalate(
                    CasePhase::Provisioning,
                    &self.descriptor.incident_key(),
                    &body,
                    kind,
                    &err,
                );
                CaseOutcome::Failed {
                    phase: CasePhase::Provisioning,
                    failure: kind,
                }
            }
        };
        CaseReport {
            connector: connector.clone(),
            gateway,
            outcome,
            instance_name: Some(instance_name),
            incidents: escalation.into_records(),
            connection_closed: guard.close(),
        }
    }

    /// Builds the report for a case that never obtained a connection.
    fn finish_without_connection(
        &self,
        escalation: Escalation<'_>,
        kind: FailureKind,
    ) -> CaseReport {
        CaseReport {
            connector: self.descriptor.name.clone(),
            gateway: GatewayStatus::Unreachable,
            outcome: CaseOutcome::Failed {
                phase: CasePhase::Gateway,
                failure: kind,
            },
            instance_name: None,
            incidents: escalation.into_records(),
            connection_closed: false,
        }
    }
}

// ============================================================================
// SECTION: Escalation
// ============================================================================

/// Per-run escalation state enforcing one report per phase.
struct Escalation<'a> {
    /// Reporter used for delivery.
    reporter: &'a dyn IncidentReporter,
    /// Connector label for logs.
    connector: &'a ConnectorName,
    /// Escalations made so far.
    records: Vec<IncidentRecord>,
}

impl<'a> Escalation<'a> {
    /// Creates empty escalation state.
    const fn new(reporter: &'a dyn IncidentReporter, connector: &'a ConnectorName) -> Self {
        Self {
            reporter,
            connector,
            records: Vec::new(),
        }
    }

    /// Reports `body` under `key` unless `phase` already escalated.
    ///
    /// Delivery failures are logged with the original cause and recorded as
    /// undelivered; they never change the case outcome.
    fn escalate(
        &mut self,
        phase: CasePhase,
        key: &IncidentKey,
        body: &IncidentBody,
        failure: FailureKind,
        cause: &dyn Display,
    ) {
        if self.records.iter().any(|record| record.phase == phase) {
            warn!(
                connector = %self.connector,
                phase = phase.as_str(),
                failure = failure.as_str(),
                cause = %cause,
                "phase already escalated; suppressing duplicate report"
            );
            return;
        }
        let receipt = match self.reporter.report(key, body) {
            Ok(receipt) => {
                info!(
                    connector = %self.connector,
                    phase = phase.as_str(),
                    failure = failure.as_str(),
                    incident_key = %key,
                    incident_id = %receipt.incident_id,
                    action = receipt.action.as_str(),
                    cause = %cause,
                    "incident reported"
                );
                Some(receipt)
            }
            Err(err) => {
                error!(
                    connector = %self.connector,
                    phase = phase.as_str(),
                    failure = failure.as_str(),
                    incident_key = %key,
                    cause = %cause,
                    delivery_failure = err.failure_kind().as_str(),
                    error = %err,
                    "incident delivery failed"
                );
                None
            }
        };
        self.records.push(IncidentRecord {
            phase,
            key: key.clone(),
            failure,
            receipt,
        });
    }

    /// Returns the recorded escalations.
    fn into_records(self) -> Vec<IncidentRecord> {
        self.records
    }
}

// ============================================================================
// SECTION: Connection Guard
// ============================================================================

/// Owns an open connection and closes it exactly once.
struct ConnectionGuard<'a> {
    /// Connector label for logs.
    connector: &'a ConnectorName,
    /// Connection until closed.
    connection: Option<Box<dyn GatewayConnection>>,
}

impl<'a> ConnectionGuard<'a> {
    /// Takes ownership of an open connection.
    fn new(connector: &'a ConnectorName, connection: Box<dyn GatewayConnection>) -> Self {
        Self {
            connector,
            connection: Some(connection),
        }
    }

    /// Returns the connection liveness.
    fn is_alive(&mut self) -> bool {
        self.connection.as_mut().is_some_and(|connection| connection.is_alive())
    }

    /// Executes a statement on the held connection.
    fn execute(&mut self, statement: ProvisioningStatement) -> Result<(), GatewayError> {
        match self.connection.as_mut() {
            Some(connection) => connection.execute(statement),
            None => Err(GatewayError::Other("connection already closed".to_string())),
        }
    }

    /// Closes the connection, returning true when the close succeeded.
    fn close(mut self) -> bool {
        self.close_inner()
    }

    /// Closes the held connection if present.
    fn close_inner(&mut self) -> bool {
        let Some(connection) = self.connection.take() else {
            return false;
        };
        match connection.close() {
            Ok(()) => true,
            Err(err) => {
                warn!(connector = %self.connector, error = %err, "gateway close failed");
                false
            }
        }
    }
}

impl Drop for ConnectionGuard<'_> {
    fn drop(&mut self) {
        let _ = self.close_inner();
    }
}
