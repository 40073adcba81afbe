// crates/connector-sentinel-core/src/core/config.rs
// ============================================================================
// Module: Connector Sentinel Config Bundles
// Description: Resolved gateway and connector configuration bundles.
// Purpose: Hold credentials for one verification run with redacted debug output.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Config bundles are resolved once per verification case and are immutable
//! afterwards. Both types hold secrets, so their `Debug` output lists field
//! names only.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

use crate::interfaces::ConfigError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default MySQL wire protocol port used by the gateway.
pub const DEFAULT_GATEWAY_PORT: u16 = 3306;

/// Raw key/value mapping returned by a config source.
pub type ConfigMapping = Map<String, Value>;

// ============================================================================
// SECTION: Connection Config
// ============================================================================

/// Connection parameters for the SQL gateway.
///
/// # Invariants
/// - `password` never appears in `Debug` output.
/// - `database` is optional; the gateway may be reached without a default database.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionConfig {
    /// Gateway host name or address.
    pub host: String,
    /// Gateway port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Login user.
    pub user: String,
    /// Login password.
    #[serde(default)]
    pub password: String,
    /// Optional default database.
    #[serde(default)]
    pub database: Option<String>,
}

impl ConnectionConfig {
    /// Builds a connection config from a resolved mapping.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Malformed`] when required fields are missing or mistyped.
    pub fn from_mapping(mapping: ConfigMapping) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_value(Value::Object(mapping))
            .map_err(|err| ConfigError::Malformed(format!("gateway config: {err}")))?;
        if config.host.trim().is_empty() {
            return Err(ConfigError::Malformed(
                "gateway config: host must be non-empty".to_string(),
            ));
        }
        Ok(config)
    }

    /// Returns a copy of this config without a default database.
    #[must_use]
    pub fn without_database(&self) -> Self {
        Self {
            database: None,
            ..self.clone()
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// Serde default for [`ConnectionConfig::port`].
const fn default_port() -> u16 {
    DEFAULT_GATEWAY_PORT
}

// ============================================================================
// SECTION: Connector Config
// ============================================================================

/// Connector-specific parameters (API keys, endpoints) for one integration.
///
/// # Invariants
/// - Keys iterate in sorted order so rendered statements are deterministic.
/// - Values never appear in `Debug` output.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectorConfig {
    /// Parameter map keyed by parameter name.
    parameters: BTreeMap<String, Value>,
}

impl ConnectorConfig {
    /// Creates an empty connector config (engines without credentials).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a connector config from a resolved mapping.
    #[must_use]
    pub fn from_mapping(mapping: ConfigMapping) -> Self {
        Self {
            parameters: mapping.into_iter().collect(),
        }
    }

    /// Returns the parameters in key order.
    pub fn parameters(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.parameters.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Returns true when no parameters are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Returns the parameters as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(self.parameters.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ConnectorConfig {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            parameters: iter.into_iter().map(|(key, value)| (key.into(), value)).collect(),
        }
    }
}

impl fmt::Debug for ConnectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorConfig")
            .field("keys", &self.parameters.keys().collect::<Vec<_>>())
            .finish()
    }
}
