//! Ingest configuration.

use evlens_core::error::{EvlensError, Result};
use evlens_core::store::DEFAULT_BLOCK_SIZE;
use evlens_core::tree::DEFAULT_TREE_BLOCK_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default time budget between two hand-offs to the consumer.
pub const DEFAULT_YIELD_BUDGET_MS: u64 = 50;

/// Configuration for an ingest session.
///
/// Loadable from YAML; missing keys take their defaults.
///
/// ```yaml
/// table_block_size: 500
/// tree_block_size: 64
/// yield_budget_ms: 50
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Event rows per table block.
    pub table_block_size: usize,
    /// Nodes per schema tree block.
    pub tree_block_size: usize,
    /// Producer time between two hand-offs, in milliseconds.
    pub yield_budget_ms: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            table_block_size: DEFAULT_BLOCK_SIZE,
            tree_block_size: DEFAULT_TREE_BLOCK_SIZE,
            yield_budget_ms: DEFAULT_YIELD_BUDGET_MS,
        }
    }
}

impl IngestConfig {
    /// Create configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `EVLENS_TABLE_BLOCK_SIZE`: Event rows per table block
    /// - `EVLENS_TREE_BLOCK_SIZE`: Nodes per schema tree block
    /// - `EVLENS_YIELD_BUDGET_MS`: Time budget between hand-offs
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        Self::default().overlay_env()
    }

    /// Override fields with any `EVLENS_*` variables that are set.
    pub fn overlay_env(self) -> Self {
        Self {
            table_block_size: env_parse("EVLENS_TABLE_BLOCK_SIZE").unwrap_or(self.table_block_size),
            tree_block_size: env_parse("EVLENS_TREE_BLOCK_SIZE").unwrap_or(self.tree_block_size),
            yield_budget_ms: env_parse("EVLENS_YIELD_BUDGET_MS").unwrap_or(self.yield_budget_ms),
        }
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| EvlensError::Io {
            path: path.to_path_buf(),
            cause: e.to_string(),
        })?;
        let config = Self::from_yaml(&yaml).map_err(|e| EvlensError::Parse {
            path: path.to_path_buf(),
            cause: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Set the table block size.
    pub fn with_table_block_size(mut self, size: usize) -> Self {
        self.table_block_size = size.max(1);
        self
    }

    /// Set the tree block size.
    pub fn with_tree_block_size(mut self, size: usize) -> Self {
        self.tree_block_size = size.max(1);
        self
    }

    /// Set the yield budget in milliseconds.
    pub fn with_yield_budget_ms(mut self, budget_ms: u64) -> Self {
        self.yield_budget_ms = budget_ms;
        self
    }

    /// The yield budget as a duration.
    pub fn yield_budget(&self) -> Duration {
        Duration::from_millis(self.yield_budget_ms)
    }

    /// Check the configuration for values the ingest loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.yield_budget_ms == 0 {
            return Err(EvlensError::ConfigValue {
                key: "yield_budget_ms".to_string(),
                cause: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse::<T>().ok())
}
