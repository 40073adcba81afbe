// crates/connector-sentinel-core/src/interfaces/mod.rs
// ============================================================================
// Module: Connector Sentinel Interfaces
// Description: Backend-agnostic interfaces for config, gateway, naming, and incidents.
// Purpose: Define the contract surfaces used by the verification runtime.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Interfaces describe every external collaborator of a verification case
//! without embedding a client library. Gateway implementations classify their
//! native errors into the closed [`GatewayError`] enumeration so the
//! orchestrator never branches on vendor error codes.
//!
//! Security posture: config mappings and statements carry credentials;
//! implementations must not log them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

use crate::core::ConfigMapping;
use crate::core::ConnectionConfig;
use crate::core::FailureKind;
use crate::core::IncidentBody;
use crate::core::IncidentKey;
use crate::core::IncidentReceipt;
use crate::core::InstanceName;
use crate::core::ProvisioningStatement;

// ============================================================================
// SECTION: Config Source
// ============================================================================

/// Config resolution errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Namespace or key is absent.
    #[error("config not found: {namespace}.{key}")]
    NotFound {
        /// Namespace that was searched.
        namespace: String,
        /// Key that was requested.
        key: String,
    },
    /// Config document did not parse or had the wrong shape.
    #[error("malformed config: {0}")]
    Malformed(String),
}

impl ConfigError {
    /// Returns the failure classification for this error.
    #[must_use]
    pub const fn failure_kind(&self) -> FailureKind {
        match self {
            Self::NotFound {
                ..
            } => FailureKind::ConfigNotFound,
            Self::Malformed(_) => FailureKind::MalformedConfig,
        }
    }
}

/// Source of named config bundles.
pub trait ConfigSource {
    /// Resolves `key` inside the document addressed by `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] when the namespace or key is absent and
    /// [`ConfigError::Malformed`] when the document does not parse.
    fn resolve(&self, namespace: &str, key: &str) -> Result<ConfigMapping, ConfigError>;
}

// ============================================================================
// SECTION: Name Generator
// ============================================================================

/// Produces collision-resistant names for ephemeral connector instances.
///
/// Entropy failure is not a recoverable condition and is not modeled.
pub trait NameGenerator {
    /// Returns `prefix` joined with a random suffix.
    fn generate(&self, prefix: &str) -> InstanceName;
}

// ============================================================================
// SECTION: Gateway
// ============================================================================

/// Closed classification of gateway failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Gateway rejected the credentials.
    #[error("gateway authentication denied: {0}")]
    AuthDenied(String),
    /// Gateway reported that the target database does not exist.
    #[error("gateway database absent: {0}")]
    DatabaseAbsent(String),
    /// Any other gateway failure.
    #[error("gateway error: {0}")]
    Other(String),
}

impl GatewayError {
    /// Returns the failure classification for this error.
    #[must_use]
    pub const fn failure_kind(&self) -> FailureKind {
        match self {
            Self::AuthDenied(_) => FailureKind::GatewayAuthDenied,
            Self::DatabaseAbsent(_) => FailureKind::GatewayDatabaseAbsent,
            Self::Other(_) => FailureKind::GatewayOtherError,
        }
    }
}

/// Failed connect attempt.
///
/// A gateway may still hand back a usable connection alongside a
/// [`GatewayError::DatabaseAbsent`] classification (for example after
/// reconnecting without a default database).
pub struct ConnectFailure {
    /// Classified connect error.
    pub error: GatewayError,
    /// Connection obtained despite the error, if any.
    pub connection: Option<Box<dyn GatewayConnection>>,
}

impl ConnectFailure {
    /// Creates a failure without a fallback connection.
    #[must_use]
    pub const fn new(error: GatewayError) -> Self {
        Self {
            error,
            connection: None,
        }
    }

    /// Creates a failure that still produced a usable connection.
    #[must_use]
    pub fn with_connection(error: GatewayError, connection: Box<dyn GatewayConnection>) -> Self {
        Self {
            error,
            connection: Some(connection),
        }
    }
}

impl fmt::Debug for ConnectFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectFailure")
            .field("error", &self.error)
            .field("has_connection", &self.connection.is_some())
            .finish()
    }
}

impl fmt::Display for ConnectFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

/// Opens connections to the SQL gateway.
pub trait GatewayConnector {
    /// Connects using the provided parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectFailure`] with a classified error when the connect fails.
    fn connect(&self, config: &ConnectionConfig)
    -> Result<Box<dyn GatewayConnection>, ConnectFailure>;
}

/// Live gateway connection owned exclusively by one verification case.
pub trait GatewayConnection {
    /// Returns true when the connection is still usable.
    fn is_alive(&mut self) -> bool;

    /// Opens a cursor for statement execution.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the cursor cannot be opened.
    fn open_cursor(&mut self) -> Result<Box<dyn GatewayCursor + '_>, GatewayError>;

    /// Closes the connection. Consumes the handle so it closes at most once.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the close handshake fails.
    fn close(self: Box<Self>) -> Result<(), GatewayError>;

    /// Executes one statement through a short-lived cursor.
    ///
    /// # Errors
    ///
    /// Returns the execution error, or the cursor close error when execution
    /// succeeded but the cursor could not be closed.
    fn execute(&mut self, statement: ProvisioningStatement) -> Result<(), GatewayError> {
        let mut cursor = self.open_cursor()?;
        let executed = cursor.execute(statement);
        let closed = cursor.close();
        executed.and(closed)
    }
}

/// Cursor over a gateway connection.
pub trait GatewayCursor {
    /// Executes a statement, consuming it.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the gateway rejects the statement.
    fn execute(&mut self, statement: ProvisioningStatement) -> Result<(), GatewayError>;

    /// Closes the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the cursor cannot be released.
    fn close(self: Box<Self>) -> Result<(), GatewayError>;
}

// ============================================================================
// SECTION: Incident Reporter
// ============================================================================

/// Incident delivery errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IncidentError {
    /// Incident service did not accept the report.
    #[error("incident delivery failed: {0}")]
    DeliveryFailed(String),
}

impl IncidentError {
    /// Returns the failure classification for this error.
    #[must_use]
    pub const fn failure_kind(&self) -> FailureKind {
        match self {
            Self::DeliveryFailed(_) => FailureKind::IncidentDeliveryFailed,
        }
    }
}

/// Escalates failures to an incident service.
///
/// Reports with the same key must collapse into one open incident.
pub trait IncidentReporter {
    /// Delivers a report under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`IncidentError::DeliveryFailed`] on transport or service failure.
    fn report(&self, key: &IncidentKey, body: &IncidentBody)
    -> Result<IncidentReceipt, IncidentError>;
}
