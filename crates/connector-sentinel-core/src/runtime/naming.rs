// crates/connector-sentinel-core/src/runtime/naming.rs
// ============================================================================
// Module: Connector Sentinel Name Generator
// Description: Random instance names for ephemeral connectors.
// Purpose: Avoid collisions between repeated provisioning attempts.
// Dependencies: rand
// ============================================================================

//! ## Overview
//! [`RandomNameGenerator`] appends a lowercase alphanumeric suffix drawn from
//! the thread RNG. Names stay valid unquoted SQL identifiers when the prefix
//! is one.

use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::core::InstanceName;
use crate::interfaces::NameGenerator;

/// Default suffix length (36^12 possible suffixes).
pub const DEFAULT_SUFFIX_LEN: usize = 12;

/// Name generator backed by the thread-local RNG.
#[derive(Debug, Clone, Copy)]
pub struct RandomNameGenerator {
    /// Number of random characters appended to the prefix.
    suffix_len: usize,
}

impl RandomNameGenerator {
    /// Creates a generator with the default suffix length.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            suffix_len: DEFAULT_SUFFIX_LEN,
        }
    }

    /// Creates a generator with a custom suffix length.
    #[must_use]
    pub const fn with_suffix_len(suffix_len: usize) -> Self {
        Self {
            suffix_len,
        }
    }
}

impl Default for RandomNameGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl NameGenerator for RandomNameGenerator {
    fn generate(&self, prefix: &str) -> InstanceName {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.suffix_len)
            .map(|byte| char::from(byte).to_ascii_lowercase())
            .collect();
        InstanceName::new(format!("{prefix}_{suffix}"))
    }
}
