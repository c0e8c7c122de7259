//! Tracing subscriber setup with format selection.

use anyhow::{Context, Result};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use super::{TracingConfig, config::LogFormat};

/// Initialize tracing with the given configuration.
///
/// Fails if a global subscriber is already installed.
///
/// # Example
///
/// ```no_run
/// use evlens_ingest::observability::{TracingConfig, init_tracing};
///
/// init_tracing(TracingConfig::from_env())?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_tracing(config: TracingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(config.log_filter()).unwrap_or_else(|_| EnvFilter::new("info"));

    macro_rules! install {
        ($layer:expr) => {
            if config.to_stderr() {
                tracing_subscriber::registry()
                    .with(filter)
                    .with($layer.with_writer(std::io::stderr))
                    .try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with($layer)
                    .try_init()
            }
        };
    }

    let installed = match config.log_format() {
        LogFormat::Json => install!(
            fmt::layer()
                .json()
                .with_file(config.include_location())
                .with_line_number(config.include_location())
                .with_target(config.include_target())
                .with_thread_names(config.include_thread_names())
                .with_span_events(FmtSpan::CLOSE)
                .flatten_event(true)
        ),
        LogFormat::Pretty => install!(
            fmt::layer()
                .pretty()
                .with_file(config.include_location())
                .with_line_number(config.include_location())
                .with_target(config.include_target())
                .with_thread_names(config.include_thread_names())
        ),
        LogFormat::Compact => install!(
            fmt::layer()
                .compact()
                .with_file(config.include_location())
                .with_line_number(config.include_location())
                .with_target(config.include_target())
                .with_thread_names(config.include_thread_names())
        ),
    };
    installed.context("Failed to initialize tracing subscriber")
}
