// crates/connector-sentinel-gateway/src/mysql.rs
// ============================================================================
// Module: MySQL Gateway Client
// Description: Blocking gateway connector over the MySQL wire protocol.
// Purpose: Connect, ping, and execute provisioning statements synchronously.
// Dependencies: connector-sentinel-core, sqlx, tokio, tracing
// ============================================================================

//! ## Overview
//! The gateway speaks the MySQL wire protocol. [`MySqlGateway`] owns a
//! current-thread tokio runtime and drives the async `sqlx` client with
//! `block_on`, so the verification case stays synchronous.
//!
//! Server errors are classified by error number: 1045 is auth denied, 1049
//! is database absent, and everything else (including I/O, TLS, and connect
//! timeouts) is other. A database-absent connect is retried once without a
//! default database; a successful retry is handed back with the failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use connector_sentinel_core::ConnectFailure;
use connector_sentinel_core::ConnectionConfig;
use connector_sentinel_core::GatewayConnection;
use connector_sentinel_core::GatewayConnector;
use connector_sentinel_core::GatewayCursor;
use connector_sentinel_core::GatewayError;
use connector_sentinel_core::ProvisioningStatement;
use sqlx::Connection;
use sqlx::Executor;
use sqlx::mysql::MySqlConnectOptions;
use sqlx::mysql::MySqlConnection;
use sqlx::mysql::MySqlDatabaseError;
use tokio::runtime::Runtime;
use tracing::debug;
use tracing::warn;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Server error number for rejected credentials.
pub const ER_ACCESS_DENIED: u16 = 1045;
/// Server error number for an unknown default database.
pub const ER_BAD_DB: u16 = 1049;
/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// SECTION: Gateway Connector
// ============================================================================

/// Gateway connector backed by `sqlx` MySQL connections.
///
/// # Invariants
/// - Every connection handed out shares this connector's runtime.
#[derive(Debug, Clone)]
pub struct MySqlGateway {
    /// Runtime driving the async client.
    runtime: Arc<Runtime>,
    /// Upper bound on each connect attempt.
    connect_timeout: Duration,
}

impl MySqlGateway {
    /// Creates a gateway connector with the given connect timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Other`] when the runtime cannot be built.
    pub fn new(connect_timeout: Duration) -> Result<Self, GatewayError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| GatewayError::Other(format!("gateway runtime: {err}")))?;
        Ok(Self {
            runtime: Arc::new(runtime),
            connect_timeout,
        })
    }

    /// Opens one connection within the connect timeout.
    fn open(&self, config: &ConnectionConfig) -> Result<MySqlConnection, GatewayError> {
        let options = connect_options(config);
        let timeout = self.connect_timeout;
        self.runtime.block_on(async {
            match tokio::time::timeout(timeout, MySqlConnection::connect_with(&options)).await {
                Ok(result) => result.map_err(|err| classify_error(&err)),
                Err(_) => Err(GatewayError::Other(format!(
                    "connect timed out after {} ms",
                    timeout.as_millis()
                ))),
            }
        })
    }

    /// Wraps an open connection.
    fn wrap(&self, connection: MySqlConnection) -> Box<dyn GatewayConnection> {
        Box::new(MySqlGatewayConnection {
            runtime: Arc::clone(&self.runtime),
            connection,
        })
    }
}

impl GatewayConnector for MySqlGateway {
    fn connect(
        &self,
        config: &ConnectionConfig,
    ) -> Result<Box<dyn GatewayConnection>, ConnectFailure> {
        debug!(host = %config.host, port = config.port, "connecting to gateway");
        match connect_with_fallback(config, |attempt| self.open(attempt)) {
            ConnectAttempt::Connected(connection) => Ok(self.wrap(connection)),
            ConnectAttempt::Degraded(error, connection) => {
                Err(ConnectFailure::with_connection(error, self.wrap(connection)))
            }
            ConnectAttempt::Failed(error) => Err(ConnectFailure::new(error)),
        }
    }
}

/// Result of a connect with database-absent fallback.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ConnectAttempt<C> {
    /// The configured database was reached.
    Connected(C),
    /// The database is absent but a connection without it was opened.
    Degraded(GatewayError, C),
    /// No connection could be opened.
    Failed(GatewayError),
}

/// Opens a connection, retrying once without a default database when the
/// configured one is absent.
///
/// The original error is kept when the retry fails.
pub(crate) fn connect_with_fallback<C>(
    config: &ConnectionConfig,
    mut open: impl FnMut(&ConnectionConfig) -> Result<C, GatewayError>,
) -> ConnectAttempt<C> {
    match open(config) {
        Ok(connection) => ConnectAttempt::Connected(connection),
        Err(error @ GatewayError::DatabaseAbsent(_)) if config.database.is_some() => {
            match open(&config.without_database()) {
                Ok(connection) => ConnectAttempt::Degraded(error, connection),
                Err(retry) => {
                    warn!(error = %retry, "gateway fallback connect failed");
                    ConnectAttempt::Failed(error)
                }
            }
        }
        Err(error) => ConnectAttempt::Failed(error),
    }
}

// ============================================================================
// SECTION: Connection and Cursor
// ============================================================================

/// Open MySQL connection.
struct MySqlGatewayConnection {
    /// Runtime shared with the connector.
    runtime: Arc<Runtime>,
    /// Underlying connection.
    connection: MySqlConnection,
}

impl GatewayConnection for MySqlGatewayConnection {
    fn is_alive(&mut self) -> bool {
        match self.runtime.block_on(self.connection.ping()) {
            Ok(()) => true,
            Err(err) => {
                debug!(error = %err, "gateway ping failed");
                false
            }
        }
    }

    fn open_cursor(&mut self) -> Result<Box<dyn GatewayCursor + '_>, GatewayError> {
        Ok(Box::new(MySqlCursor {
            runtime: &self.runtime,
            connection: &mut self.connection,
        }))
    }

    fn close(self: Box<Self>) -> Result<(), GatewayError> {
        let Self {
            runtime,
            connection,
        } = *self;
        runtime.block_on(connection.close()).map_err(|err| classify_error(&err))
    }
}

/// Cursor executing text-protocol statements on a borrowed connection.
struct MySqlCursor<'a> {
    /// Runtime shared with the connection.
    runtime: &'a Runtime,
    /// Borrowed connection.
    connection: &'a mut MySqlConnection,
}

impl GatewayCursor for MySqlCursor<'_> {
    fn execute(&mut self, statement: ProvisioningStatement) -> Result<(), GatewayError> {
        let text = statement.into_text();
        self.runtime
            .block_on(Executor::execute(&mut *self.connection, text.as_str()))
            .map(|_| ())
            .map_err(|err| classify_error(&err))
    }

    fn close(self: Box<Self>) -> Result<(), GatewayError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps connection parameters onto `sqlx` connect options.
#[must_use]
pub fn connect_options(config: &ConnectionConfig) -> MySqlConnectOptions {
    let options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password);
    match &config.database {
        Some(database) => options.database(database),
        None => options,
    }
}

/// Classifies a server error number and message.
#[must_use]
pub fn classify_server_error(number: u16, message: &str) -> GatewayError {
    let text = format!("[{number}] {message}");
    match number {
        ER_ACCESS_DENIED => GatewayError::AuthDenied(text),
        ER_BAD_DB => GatewayError::DatabaseAbsent(text),
        _ => GatewayError::Other(text),
    }
}

/// Classifies a client error into the closed gateway error set.
fn classify_error(err: &sqlx::Error) -> GatewayError {
    if let sqlx::Error::Database(database) = err {
        if let Some(mysql) = database.try_downcast_ref::<MySqlDatabaseError>() {
            return classify_server_error(mysql.number(), mysql.message());
        }
    }
    GatewayError::Other(err.to_string())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_server_error_maps_known_numbers() {
        assert!(matches!(classify_server_error(1045, "denied"), GatewayError::AuthDenied(_)));
        assert!(matches!(classify_server_error(1049, "unknown"), GatewayError::DatabaseAbsent(_)));
        assert!(matches!(classify_server_error(1064, "syntax"), GatewayError::Other(_)));
        assert!(matches!(classify_server_error(2013, "lost"), GatewayError::Other(_)));
    }

    #[test]
    fn classify_server_error_keeps_number_and_message() {
        let error = classify_server_error(1045, "Access denied for user 'bot'");
        assert!(error.to_string().contains("[1045] Access denied for user 'bot'"));
    }

    #[test]
    fn classify_error_treats_transport_failures_as_other() {
        let err = sqlx::Error::PoolTimedOut;
        assert!(matches!(classify_error(&err), GatewayError::Other(_)));
    }

    /// Gateway config with the `mindsdb` default database.
    fn config_with_database() -> ConnectionConfig {
        ConnectionConfig {
            host: "gw.example".to_string(),
            port: 47335,
            user: "bot".to_string(),
            password: String::new(),
            database: Some("mindsdb".to_string()),
        }
    }

    /// Runs the fallback over scripted results, returning the databases tried.
    fn attempt(
        config: &ConnectionConfig,
        mut results: Vec<Result<&'static str, GatewayError>>,
    ) -> (ConnectAttempt<&'static str>, Vec<Option<String>>) {
        let mut tried = Vec::new();
        results.reverse();
        let outcome = connect_with_fallback(config, |attempt| {
            tried.push(attempt.database.clone());
            results
                .pop()
                .unwrap_or_else(|| Err(GatewayError::Other("unexpected connect".to_string())))
        });
        (outcome, tried)
    }

    /// Database-absent error used by the fallback tests.
    fn absent() -> GatewayError {
        GatewayError::DatabaseAbsent("[1049] Unknown database 'mindsdb'".to_string())
    }

    #[test]
    fn fallback_not_used_when_first_connect_succeeds() {
        let (outcome, tried) = attempt(&config_with_database(), vec![Ok("primary")]);

        assert_eq!(outcome, ConnectAttempt::Connected("primary"));
        assert_eq!(tried, [Some("mindsdb".to_string())]);
    }

    #[test]
    fn absent_database_retries_without_database_and_degrades() {
        let (outcome, tried) = attempt(&config_with_database(), vec![Err(absent()), Ok("bare")]);

        assert_eq!(outcome, ConnectAttempt::Degraded(absent(), "bare"));
        assert_eq!(tried, [Some("mindsdb".to_string()), None]);
    }

    #[test]
    fn failed_retry_keeps_original_database_absent_error() {
        let (outcome, tried) = attempt(
            &config_with_database(),
            vec![Err(absent()), Err(GatewayError::Other("connection reset".to_string()))],
        );

        assert_eq!(outcome, ConnectAttempt::Failed(absent()));
        assert_eq!(tried.len(), 2);
    }

    #[test]
    fn absent_database_without_configured_database_is_not_retried() {
        let config = config_with_database().without_database();

        let (outcome, tried) = attempt(&config, vec![Err(absent())]);

        assert_eq!(outcome, ConnectAttempt::Failed(absent()));
        assert_eq!(tried, [None]);
    }

    #[test]
    fn other_errors_are_not_retried() {
        let denied = GatewayError::AuthDenied("[1045] denied".to_string());

        let (outcome, tried) = attempt(&config_with_database(), vec![Err(denied.clone())]);

        assert_eq!(outcome, ConnectAttempt::Failed(denied));
        assert_eq!(tried.len(), 1);
    }

    #[test]
    fn connect_options_carry_connection_parameters() {
        let config = ConnectionConfig {
            host: "gw.example".to_string(),
            port: 47335,
            user: "bot".to_string(),
            password: "hunter2".to_string(),
            database: Some("mindsdb".to_string()),
        };

        let options = connect_options(&config);
        assert_eq!(options.get_host(), "gw.example");
        assert_eq!(options.get_port(), 47335);
        assert_eq!(options.get_username(), "bot");
        assert_eq!(options.get_database(), Some("mindsdb"));

        let fallback = connect_options(&config.without_database());
        assert_eq!(fallback.get_database(), None);
    }
}
