//! Logging setup for evlens.
//!
//! Logging format is controlled via `EVLENS_LOG_FORMAT`:
//! - `json` - Structured JSON output
//! - `pretty` - Human-readable colored output (default for TTY)
//! - `compact` - Compact single-line format (default for non-TTY)
//!
//! The filter comes from `EVLENS_LOG_LEVEL`, falling back to `RUST_LOG`.

mod config;
mod tracing_setup;

pub use config::{LogFormat, TracingConfig, TracingConfigBuilder};
pub use tracing_setup::init_tracing;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.log_format(), LogFormat::Compact);
        assert_eq!(config.log_filter(), "info");
        assert!(config.to_stderr());
    }

    #[test]
    fn test_config_builder() {
        let config = TracingConfig::builder()
            .json_format(true)
            .log_filter("debug,evlens_ingest=trace")
            .include_location(true)
            .to_stderr(false)
            .build();

        assert_eq!(config.log_format(), LogFormat::Json);
        assert_eq!(config.log_filter(), "debug,evlens_ingest=trace");
        assert!(config.include_location());
        assert!(config.include_target());
        assert!(!config.to_stderr());
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("bogus".parse::<LogFormat>().unwrap(), LogFormat::Compact);
    }
}
