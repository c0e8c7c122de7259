//! Synth command - ingest synthetic CAN-bus traffic.

use super::{ViewOptions, console};
use anyhow::Result;
use evlens_ingest::sources::SyntheticCanSource;

/// Run the synth command.
pub async fn run(limit: Option<u64>, seed: u64, options: &ViewOptions) -> Result<()> {
    tracing::info!(?limit, seed, "Generating synthetic CAN traffic");

    let source = SyntheticCanSource::new(seed);
    let source = match limit {
        Some(limit) => source.with_limit(limit),
        None => {
            println!("No --limit given, press Ctrl-C to stop.");
            source
        }
    };
    console::run(source, options).await
}
