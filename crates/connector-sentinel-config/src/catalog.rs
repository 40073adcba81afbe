// crates/connector-sentinel-config/src/catalog.rs
// ============================================================================
// Module: Built-in Connector Catalog
// Description: Connectors verified when the config file lists none.
// Purpose: Keep the production connector set in one place.
// Dependencies: connector-sentinel-core
// ============================================================================

//! ## Overview
//! Each entry pairs a gateway engine type with the Instatus component that
//! tracks it. ML engines without credentials carry no config key.

use connector_sentinel_core::ConnectorDescriptor;
use connector_sentinel_core::ConnectorName;
use connector_sentinel_core::ConnectorType;
use connector_sentinel_core::TargetKind;
use connector_sentinel_core::TrackingId;

/// Compact catalog row: name, display, target, type, config key, prefix, tracking id.
type CatalogRow = (
    &'static str,
    &'static str,
    TargetKind,
    &'static str,
    Option<&'static str>,
    &'static str,
    &'static str,
);

/// Production connector rows.
const CATALOG: &[CatalogRow] = &[
    (
        "twitter",
        "Twitter",
        TargetKind::Datasource,
        "twitter",
        Some("twitter"),
        "twitter_datasource",
        "clkwkimng21735bbocc2j7zguy",
    ),
    (
        "singlestore",
        "SingleStore",
        TargetKind::Datasource,
        "singlestore",
        Some("singlestore"),
        "singlestore_datasource",
        "clktt1yl1108521bqoh3gchinum",
    ),
    (
        "aurora_mysql",
        "Amazon Aurora MySQL",
        TargetKind::Datasource,
        "aurora",
        Some("aws_mysql"),
        "aurora_mysql_datasource",
        "clktp2ulb175778c1oqbp0rev8j",
    ),
    (
        "aurora_postgresql",
        "Amazon Aurora PostgreSQL",
        TargetKind::Datasource,
        "aurora",
        Some("aws_postgresql"),
        "aurora_postgresql_datasource",
        "clktp3jrv174405c8oqfjwvunwh",
    ),
    (
        "huggingface_api",
        "Hugging Face Inference API",
        TargetKind::MlEngine,
        "huggingface_api",
        Some("huggingface"),
        "hf_api_engine",
        "clktqxt8o55593bxohrv6fcswq",
    ),
    (
        "huggingface",
        "Hugging Face",
        TargetKind::MlEngine,
        "huggingface",
        None,
        "hf_engine",
        "clkmp2cnx97265ayokfx1xnmal",
    ),
];

/// Returns the built-in connector catalog.
#[must_use]
pub fn builtin_catalog() -> Vec<ConnectorDescriptor> {
    CATALOG
        .iter()
        .map(|&(name, display_name, target, connector_type, config_key, prefix, tracking_id)| {
            ConnectorDescriptor {
                name: ConnectorName::new(name),
                display_name: display_name.to_string(),
                target,
                connector_type: ConnectorType::new(connector_type),
                config_key: config_key.map(str::to_string),
                instance_prefix: prefix.to_string(),
                tracking_id: TrackingId::new(tracking_id),
            }
        })
        .collect()
}
