// crates/connector-sentinel-core/src/runtime/query.rs
// ============================================================================
// Module: Connector Sentinel Query Builder
// Description: Renders provisioning statements in the gateway's SQL dialect.
// Purpose: Turn a connector descriptor and config into a single statement.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! The builder performs plain textual interpolation. It does not quote or
//! escape names, engine types, or parameter values; callers must only pass
//! trusted configuration.
//!
//! Dialect:
//! - `CREATE DATABASE <name> WITH ENGINE = '<type>', PARAMETERS = {...};`
//! - `CREATE ML_ENGINE <name> FROM <type> USING k = v, ...;`
//!
//! Empty configs drop the `PARAMETERS` / `USING` clause entirely.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::core::ConnectorConfig;
use crate::core::ConnectorType;
use crate::core::InstanceName;
use crate::core::ProvisioningStatement;
use crate::core::TargetKind;

// ============================================================================
// SECTION: Query Builder
// ============================================================================

/// Renders provisioning statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBuilder;

impl QueryBuilder {
    /// Renders the statement for the given target kind.
    #[must_use]
    pub fn build(
        target: TargetKind,
        name: &InstanceName,
        connector_type: &ConnectorType,
        config: &ConnectorConfig,
    ) -> ProvisioningStatement {
        match target {
            TargetKind::Datasource => Self::build_create_datasource(name, connector_type, config),
            TargetKind::MlEngine => Self::build_create_ml_engine(name, connector_type, config),
        }
    }

    /// Renders a `CREATE DATABASE` statement for an external data source.
    #[must_use]
    pub fn build_create_datasource(
        name: &InstanceName,
        connector_type: &ConnectorType,
        config: &ConnectorConfig,
    ) -> ProvisioningStatement {
        let mut text = format!("CREATE DATABASE {name} WITH ENGINE = '{connector_type}'");
        if !config.is_empty() {
            text.push_str(", PARAMETERS = ");
            text.push_str(&config.to_json().to_string());
        }
        text.push(';');
        ProvisioningStatement::new(text)
    }

    /// Renders a `CREATE ML_ENGINE` statement.
    #[must_use]
    pub fn build_create_ml_engine(
        name: &InstanceName,
        engine_type: &ConnectorType,
        config: &ConnectorConfig,
    ) -> ProvisioningStatement {
        let mut text = format!("CREATE ML_ENGINE {name} FROM {engine_type}");
        if !config.is_empty() {
            let assignments = config
                .parameters()
                .map(|(key, value)| format!("{key} = {}", render_value(value)))
                .collect::<Vec<_>>()
                .join(", ");
            text.push_str(" USING ");
            text.push_str(&assignments);
        }
        text.push(';');
        ProvisioningStatement::new(text)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Renders a `USING` value: strings single-quoted, everything else as JSON.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => format!("'{text}'"),
        other => other.to_string(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
