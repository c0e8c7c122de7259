//! Version command - show version information.

use anyhow::Result;

/// Version information.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the version command.
pub fn run() -> Result<()> {
    println!("evlens - Live trace event viewer");
    println!();
    println!("Version:     {}", VERSION);
    println!(
        "Platform:    {} / {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    println!();
    println!("Components:");
    println!("  evlens-core    Block store, table and tree views, trace model");
    println!("  evlens-ingest  Time-sliced scheduler, schema walker, sources");
    println!("  evlens-cli     Command-line interface");

    Ok(())
}
