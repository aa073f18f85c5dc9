//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `stream_status` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use stream_status::initialization::init_logger_with;
use stream_status::{run_check, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments into Config
    let config = Config::parse();

    // Initialize logger based on config
    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    // Run the check using the library
    match run_check(config).await {
        Ok(report) => {
            println!(
                "Checked {} link{} ({} up, {} down, {:.1}% success) in {:.1}s",
                report.total,
                if report.total == 1 { "" } else { "s" },
                report.success,
                report.failed,
                report.success_rate,
                report.elapsed_seconds
            );
            println!("Results saved in {}", report.db_path.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("stream_status error: {:#}", e);
            process::exit(1);
        }
    }
}
