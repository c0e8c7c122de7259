//! Replay command - ingest a recorded trace file.

use super::{ViewOptions, console};
use anyhow::{Context, Result};
use evlens_ingest::sources::ReplaySource;
use std::path::Path;

/// Run the replay command.
pub async fn run(file: &Path, options: &ViewOptions) -> Result<()> {
    tracing::info!(file = %file.display(), "Replaying trace");

    if !file.exists() {
        anyhow::bail!("Trace file not found: {}", file.display());
    }

    let source = ReplaySource::from_file(file)
        .with_context(|| format!("Failed to open trace: {}", file.display()))?;
    console::run(source, options).await
}
