//! evlens CLI - Console viewer for live trace event streams.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::ViewOptions;
use evlens_ingest::observability::{LogFormat, TracingConfig, init_tracing};
use std::path::PathBuf;

/// evlens - Live trace event viewer.
#[derive(Parser)]
#[command(name = "evlens")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Ingest configuration file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Producer time between two hand-offs, in milliseconds
    #[arg(long, global = true)]
    budget_ms: Option<u64>,

    /// Print the status line on every hand-off
    #[arg(short, long, global = true)]
    follow: bool,

    /// Print the schema tree once ingestion stops
    #[arg(short, long, global = true)]
    tree: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded trace (.yaml, .yml, .json or .jsonl)
    Replay {
        /// Path to the trace file
        #[arg(long)]
        file: PathBuf,
    },

    /// Ingest synthetic CAN-bus traffic
    Synth {
        /// Stop after this many events (endless if omitted)
        #[arg(short, long)]
        limit: Option<u64>,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },

    /// Show version information
    Version,
}

fn setup_logging(verbosity: u8) -> Result<()> {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // Check for explicit log format override, otherwise auto-detect
    let log_format = std::env::var("EVLENS_LOG_FORMAT")
        .ok()
        .and_then(|s| s.parse::<LogFormat>().ok())
        .unwrap_or_else(|| {
            if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
                LogFormat::Pretty
            } else {
                LogFormat::Compact
            }
        });

    // Build config, respecting EVLENS_LOG_LEVEL / RUST_LOG if set
    let log_filter = std::env::var("EVLENS_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| filter.to_string());

    let config = TracingConfig::builder()
        .log_format(log_format)
        .log_filter(log_filter)
        .to_stderr(true)
        .build();

    init_tracing(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    let options = ViewOptions {
        config: cli.config,
        budget_ms: cli.budget_ms,
        follow: cli.follow,
        tree: cli.tree,
    };

    match cli.command {
        Commands::Replay { file } => commands::replay::run(&file, &options).await,
        Commands::Synth { limit, seed } => commands::synth::run(limit, seed, &options).await,
        Commands::Version => commands::version::run(),
    }
}
