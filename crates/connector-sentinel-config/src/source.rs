// crates/connector-sentinel-config/src/source.rs
// ============================================================================
// Module: Environment Config Source
// Description: Config bundle resolution from an environment JSON document.
// Purpose: Resolve gateway and connector secrets without touching disk.
// Dependencies: connector-sentinel-core, serde_json
// ============================================================================

//! ## Overview
//! The environment source reads one variable (the namespace) holding a JSON
//! object of bundles, then returns the object stored under the requested key.
//! Overrides replace process environment reads for deterministic lookups.
//! Hard size limits apply to both the namespace name and the document.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::env::VarError;

use connector_sentinel_core::ConfigError;
use connector_sentinel_core::ConfigMapping;
use connector_sentinel_core::ConfigSource;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum size of the JSON document in bytes.
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 1024 * 1024;
/// Default maximum length of the namespace variable name.
pub const DEFAULT_MAX_NAMESPACE_BYTES: usize = 255;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Settings for [`EnvConfigSource`].
///
/// # Invariants
/// - `overrides` take precedence over process environment reads.
/// - Size limits are hard upper bounds and fail closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSourceConfig {
    /// Maximum bytes allowed for the JSON document.
    pub max_document_bytes: usize,
    /// Maximum bytes allowed for the namespace variable name.
    pub max_namespace_bytes: usize,
    /// Optional override map keyed by namespace.
    pub overrides: Option<BTreeMap<String, String>>,
}

impl Default for EnvSourceConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            max_namespace_bytes: DEFAULT_MAX_NAMESPACE_BYTES,
            overrides: None,
        }
    }
}

// ============================================================================
// SECTION: Source Implementation
// ============================================================================

/// Config source backed by environment variables holding JSON documents.
#[derive(Debug, Clone, Default)]
pub struct EnvConfigSource {
    /// Source settings and overrides.
    config: EnvSourceConfig,
}

impl EnvConfigSource {
    /// Creates a source with the given settings.
    #[must_use]
    pub const fn new(config: EnvSourceConfig) -> Self {
        Self {
            config,
        }
    }

    /// Creates a source that only reads from `overrides`.
    #[must_use]
    pub fn with_overrides(overrides: BTreeMap<String, String>) -> Self {
        Self::new(EnvSourceConfig {
            overrides: Some(overrides),
            ..EnvSourceConfig::default()
        })
    }

    /// Reads the raw document for `namespace`, or `None` when unset.
    fn read_document(&self, namespace: &str) -> Result<Option<String>, ConfigError> {
        if let Some(overrides) = &self.config.overrides {
            return Ok(overrides.get(namespace).cloned());
        }
        match env::var(namespace) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => {
                Err(ConfigError::Malformed(format!("{namespace} is not valid unicode")))
            }
        }
    }
}

impl ConfigSource for EnvConfigSource {
    fn resolve(&self, namespace: &str, key: &str) -> Result<ConfigMapping, ConfigError> {
        if namespace.is_empty() || namespace.len() > self.config.max_namespace_bytes {
            return Err(ConfigError::Malformed("config namespace length out of range".to_string()));
        }
        let not_found = || ConfigError::NotFound {
            namespace: namespace.to_string(),
            key: key.to_string(),
        };
        let document = self.read_document(namespace)?.ok_or_else(not_found)?;
        if document.len() > self.config.max_document_bytes {
            return Err(ConfigError::Malformed(format!("{namespace} exceeds size limit")));
        }
        let parsed: Value = serde_json::from_str(&document).map_err(|err| {
            ConfigError::Malformed(format!("{namespace} is not valid JSON: {err}"))
        })?;
        let Value::Object(mut bundles) = parsed else {
            return Err(ConfigError::Malformed(format!("{namespace} must be a JSON object")));
        };
        match bundles.remove(key) {
            Some(Value::Object(mapping)) => Ok(mapping),
            Some(_) => Err(ConfigError::Malformed(format!("{namespace}.{key} must be an object"))),
            None => Err(not_found()),
        }
    }
}
