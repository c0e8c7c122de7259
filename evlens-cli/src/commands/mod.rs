//! CLI command implementations.

mod console;
pub mod replay;
pub mod synth;
pub mod version;

use anyhow::{Context, Result};
use evlens_ingest::config::IngestConfig;
use std::path::PathBuf;

/// Options shared by the ingesting commands.
#[derive(Debug, Clone, Default)]
pub struct ViewOptions {
    /// Ingest configuration file.
    pub config: Option<PathBuf>,
    /// Overrides the configured yield budget.
    pub budget_ms: Option<u64>,
    /// Print the status line on every hand-off.
    pub follow: bool,
    /// Print the schema tree at the end.
    pub tree: bool,
}

impl ViewOptions {
    /// Resolve the ingest configuration: file or defaults, then environment,
    /// then command-line overrides.
    pub fn ingest_config(&self) -> Result<IngestConfig> {
        let config = match &self.config {
            Some(path) => IngestConfig::from_file(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => IngestConfig::default(),
        };
        let mut config = config.overlay_env();
        if let Some(budget_ms) = self.budget_ms {
            config = config.with_yield_budget_ms(budget_ms);
        }
        config.validate().context("Invalid ingest configuration")?;
        Ok(config)
    }
}
