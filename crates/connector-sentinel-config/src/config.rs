// crates/connector-sentinel-config/src/config.rs
// ============================================================================
// Module: Connector Sentinel Configuration
// Description: Harness configuration loading and validation.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: connector-sentinel-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section is optional; a missing file is an I/O error, while an empty
//! file yields the defaults plus the built-in connector catalog.
//! Secrets never live in this file: it only names the environment variables
//! that hold them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use connector_sentinel_core::CaseSettings;
use connector_sentinel_core::ConnectorDescriptor;
use connector_sentinel_core::TrackingId;
use connector_sentinel_core::runtime::DEFAULT_CONFIG_NAMESPACE;
use connector_sentinel_core::runtime::DEFAULT_GATEWAY_CONFIG_KEY;
use connector_sentinel_core::runtime::DEFAULT_GATEWAY_TRACKING_ID;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::catalog::builtin_catalog;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "connector-sentinel.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "CONNECTOR_SENTINEL_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of identifiers such as names, keys, and env var names.
pub(crate) const MAX_IDENTIFIER_LENGTH: usize = 255;
/// Minimum gateway connect timeout in milliseconds.
pub(crate) const MIN_CONNECT_TIMEOUT_MS: u64 = 100;
/// Maximum gateway connect timeout in milliseconds.
pub(crate) const MAX_CONNECT_TIMEOUT_MS: u64 = 60_000;
/// Default gateway connect timeout in milliseconds.
pub(crate) const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;
/// Minimum incident request timeout in milliseconds.
pub(crate) const MIN_INCIDENT_TIMEOUT_MS: u64 = 500;
/// Maximum incident request timeout in milliseconds.
pub(crate) const MAX_INCIDENT_TIMEOUT_MS: u64 = 60_000;
/// Default incident request timeout in milliseconds.
pub(crate) const DEFAULT_INCIDENT_TIMEOUT_MS: u64 = 10_000;
/// Default Instatus API base URL.
pub const DEFAULT_INSTATUS_BASE_URL: &str = "https://api.instatus.com";
/// Default variable holding the Instatus page ID.
pub const DEFAULT_INSTATUS_PAGE_ID_ENV: &str = "INSTATUS_PAGE_ID";
/// Default variable holding the Instatus API key.
pub const DEFAULT_INSTATUS_API_KEY_ENV: &str = "INSTATUS_API_KEY";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Connector Sentinel harness configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentinelConfig {
    /// Secret source configuration.
    #[serde(default)]
    pub source: SourceConfig,
    /// Gateway configuration.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Incident backend configuration.
    #[serde(default)]
    pub incidents: IncidentsConfig,
    /// Connectors to verify, in run order.
    #[serde(default = "builtin_catalog")]
    pub connectors: Vec<ConnectorDescriptor>,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            gateway: GatewayConfig::default(),
            incidents: IncidentsConfig::default(),
            connectors: builtin_catalog(),
        }
    }
}

impl SentinelConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: explicit `path`, then [`CONFIG_ENV_VAR`], then
    /// `connector-sentinel.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`SentinelConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, SentinelConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| {
            SentinelConfigError::Io(format!("{}: {err}", resolved.display()))
        })?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(SentinelConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| SentinelConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`SentinelConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, SentinelConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| SentinelConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`SentinelConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), SentinelConfigError> {
        self.source.validate()?;
        self.gateway.validate()?;
        self.incidents.validate()?;
        validate_connectors(&self.connectors)
    }

    /// Returns the settings shared by every verification case.
    #[must_use]
    pub fn case_settings(&self) -> CaseSettings {
        CaseSettings {
            config_namespace: self.source.env_var.clone(),
            gateway_config_key: self.gateway.config_key.clone(),
            gateway_tracking_id: self.gateway.tracking_id.clone(),
        }
    }

    /// Selects connectors by name, preserving config order.
    ///
    /// An empty selection returns every configured connector.
    ///
    /// # Errors
    ///
    /// Returns [`SentinelConfigError::UnknownConnector`] for names that are not configured.
    pub fn select_connectors(
        &self,
        names: &[String],
    ) -> Result<Vec<ConnectorDescriptor>, SentinelConfigError> {
        if names.is_empty() {
            return Ok(self.connectors.clone());
        }
        for name in names {
            if !self.connectors.iter().any(|connector| connector.name.as_str() == name) {
                return Err(SentinelConfigError::UnknownConnector(name.clone()));
            }
        }
        Ok(self
            .connectors
            .iter()
            .filter(|connector| names.iter().any(|name| name == connector.name.as_str()))
            .cloned()
            .collect())
    }
}

/// Secret source configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Environment variable holding the JSON document of config bundles.
    #[serde(default = "default_env_var")]
    pub env_var: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            env_var: default_env_var(),
        }
    }
}

impl SourceConfig {
    /// Validates the secret source configuration.
    fn validate(&self) -> Result<(), SentinelConfigError> {
        validate_env_name("source.env_var", &self.env_var)
    }
}

/// Gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Key of the gateway connection bundle.
    #[serde(default = "default_gateway_config_key")]
    pub config_key: String,
    /// Tracking ID for gateway incidents.
    #[serde(default = "default_gateway_tracking_id")]
    pub tracking_id: TrackingId,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            config_key: default_gateway_config_key(),
            tracking_id: default_gateway_tracking_id(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

impl GatewayConfig {
    /// Validates the gateway configuration.
    fn validate(&self) -> Result<(), SentinelConfigError> {
        validate_identifier("gateway.config_key", &self.config_key)?;
        validate_identifier("gateway.tracking_id", self.tracking_id.as_str())?;
        validate_range(
            "gateway.connect_timeout_ms",
            self.connect_timeout_ms,
            MIN_CONNECT_TIMEOUT_MS,
            MAX_CONNECT_TIMEOUT_MS,
        )
    }
}

/// Incident backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentBackend {
    /// Instatus status page API.
    #[default]
    Instatus,
    /// JSON lines on stderr.
    Log,
}

/// Incident reporting configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentsConfig {
    /// Backend that receives incident reports.
    #[serde(default)]
    pub backend: IncidentBackend,
    /// Instatus backend settings.
    #[serde(default)]
    pub instatus: InstatusConfig,
}

impl IncidentsConfig {
    /// Validates the incident configuration.
    fn validate(&self) -> Result<(), SentinelConfigError> {
        match self.backend {
            IncidentBackend::Instatus => self.instatus.validate(),
            IncidentBackend::Log => Ok(()),
        }
    }
}

/// Instatus backend settings.
///
/// # Invariants
/// - Credentials are named by environment variable, never stored inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstatusConfig {
    /// API base URL.
    #[serde(default = "default_instatus_base_url")]
    pub base_url: String,
    /// Environment variable holding the status page ID.
    #[serde(default = "default_instatus_page_id_env")]
    pub page_id_env: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_instatus_api_key_env")]
    pub api_key_env: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_incident_timeout_ms")]
    pub timeout_ms: u64,
    /// Whether status page subscribers are notified.
    #[serde(default = "default_notify")]
    pub notify: bool,
    /// Allow cleartext HTTP base URLs.
    #[serde(default)]
    pub allow_http: bool,
}

impl Default for InstatusConfig {
    fn default() -> Self {
        Self {
            base_url: default_instatus_base_url(),
            page_id_env: default_instatus_page_id_env(),
            api_key_env: default_instatus_api_key_env(),
            timeout_ms: DEFAULT_INCIDENT_TIMEOUT_MS,
            notify: default_notify(),
            allow_http: false,
        }
    }
}

impl InstatusConfig {
    /// Validates the Instatus settings.
    fn validate(&self) -> Result<(), SentinelConfigError> {
        let base_url = self.base_url.trim();
        let scheme_ok = base_url.starts_with("https://")
            || (self.allow_http && base_url.starts_with("http://"));
        if !scheme_ok {
            return Err(SentinelConfigError::Invalid(
                "incidents.instatus.base_url must use https unless allow_http is set".to_string(),
            ));
        }
        validate_env_name("incidents.instatus.page_id_env", &self.page_id_env)?;
        validate_env_name("incidents.instatus.api_key_env", &self.api_key_env)?;
        validate_range(
            "incidents.instatus.timeout_ms",
            self.timeout_ms,
            MIN_INCIDENT_TIMEOUT_MS,
            MAX_INCIDENT_TIMEOUT_MS,
        )
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SentinelConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// A requested connector is not configured.
    #[error("unknown connector: {0}")]
    UnknownConnector(String),
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default secret source variable.
fn default_env_var() -> String {
    DEFAULT_CONFIG_NAMESPACE.to_string()
}

/// Default gateway bundle key.
fn default_gateway_config_key() -> String {
    DEFAULT_GATEWAY_CONFIG_KEY.to_string()
}

/// Default gateway tracking ID.
fn default_gateway_tracking_id() -> TrackingId {
    TrackingId::new(DEFAULT_GATEWAY_TRACKING_ID)
}

/// Default gateway connect timeout.
const fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

/// Default Instatus base URL.
fn default_instatus_base_url() -> String {
    DEFAULT_INSTATUS_BASE_URL.to_string()
}

/// Default Instatus page ID variable.
fn default_instatus_page_id_env() -> String {
    DEFAULT_INSTATUS_PAGE_ID_ENV.to_string()
}

/// Default Instatus API key variable.
fn default_instatus_api_key_env() -> String {
    DEFAULT_INSTATUS_API_KEY_ENV.to_string()
}

/// Default incident request timeout.
const fn default_incident_timeout_ms() -> u64 {
    DEFAULT_INCIDENT_TIMEOUT_MS
}

/// Subscribers are notified by default.
const fn default_notify() -> bool {
    true
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, SentinelConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(SentinelConfigError::Invalid(
                "config path exceeds max length".to_string(),
            ));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), SentinelConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SentinelConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SentinelConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a non-empty identifier within the length limit.
fn validate_identifier(field: &str, value: &str) -> Result<(), SentinelConfigError> {
    if value.trim().is_empty() {
        return Err(SentinelConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if value.len() > MAX_IDENTIFIER_LENGTH {
        return Err(SentinelConfigError::Invalid(format!("{field} exceeds max length")));
    }
    Ok(())
}

/// Validates an environment variable name (`[A-Za-z0-9_]`, not starting with a digit).
fn validate_env_name(field: &str, value: &str) -> Result<(), SentinelConfigError> {
    validate_identifier(field, value)?;
    let valid = value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !value.starts_with(|c: char| c.is_ascii_digit());
    if !valid {
        return Err(SentinelConfigError::Invalid(format!(
            "{field} must be a valid environment variable name"
        )));
    }
    Ok(())
}

/// Validates an instance prefix as an unquoted SQL identifier.
fn validate_prefix(field: &str, value: &str) -> Result<(), SentinelConfigError> {
    validate_identifier(field, value)?;
    let valid = value.starts_with(|c: char| c.is_ascii_lowercase())
        && value.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if !valid {
        return Err(SentinelConfigError::Invalid(format!(
            "{field} must match [a-z][a-z0-9_]*"
        )));
    }
    Ok(())
}

/// Validates an inclusive numeric range.
fn validate_range(field: &str, value: u64, min: u64, max: u64) -> Result<(), SentinelConfigError> {
    if !(min..=max).contains(&value) {
        return Err(SentinelConfigError::Invalid(format!(
            "{field} must be between {min} and {max}"
        )));
    }
    Ok(())
}

/// Validates connector descriptors and their uniqueness.
fn validate_connectors(connectors: &[ConnectorDescriptor]) -> Result<(), SentinelConfigError> {
    if connectors.is_empty() {
        return Err(SentinelConfigError::Invalid("connectors must be non-empty".to_string()));
    }
    let mut names = BTreeSet::new();
    let mut tracking_ids = BTreeSet::new();
    for connector in connectors {
        let name = connector.name.as_str();
        validate_identifier("connectors.name", name)?;
        validate_identifier(&format!("connectors[{name}].display_name"), &connector.display_name)?;
        validate_identifier(
            &format!("connectors[{name}].connector_type"),
            connector.connector_type.as_str(),
        )?;
        validate_identifier(
            &format!("connectors[{name}].tracking_id"),
            connector.tracking_id.as_str(),
        )?;
        if let Some(key) = &connector.config_key {
            validate_identifier(&format!("connectors[{name}].config_key"), key)?;
        }
        validate_prefix(
            &format!("connectors[{name}].instance_prefix"),
            &connector.instance_prefix,
        )?;
        if !names.insert(name) {
            return Err(SentinelConfigError::Invalid(format!("duplicate connector name: {name}")));
        }
        if !tracking_ids.insert(connector.tracking_id.as_str()) {
            return Err(SentinelConfigError::Invalid(format!(
                "duplicate tracking_id for connector {name}"
            )));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
