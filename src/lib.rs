//! stream_status library: link verification and quality scoring
//!
//! This library verifies candidate streaming URLs for named channels. Each
//! link goes through an HTTP reachability probe, an optional ffprobe media
//! probe, a merge of the two outcomes into a scored verdict, and a status
//! transition on its persistent record, concurrently across a whole batch
//! with per-link failures isolated.
//!
//! # Example
//!
//! ```no_run
//! use stream_status::{run_check, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     max_concurrency: 50,
//!     ..Default::default()
//! };
//!
//! let report = run_check(config).await?;
//! println!(
//!     "Checked {} links: {} up, {} down",
//!     report.total, report.success, report.failed
//! );
//! # Ok(())
//! # }
//! ```

pub mod candidate;
pub mod channels;
pub mod checker;
pub mod config;
mod error_handling;
pub mod initialization;
pub mod matcher;
pub mod probe;
mod process;
pub mod state;
pub mod storage;

// Re-export public API
pub use checker::{BatchReport, LinkChecker};
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{DatabaseError, ErrorStats, ErrorType, InitializationError};
pub use matcher::matches;
pub use run::{run_check, CheckReport};
pub use storage::create_tables;

// Internal run module (end-to-end check run)
mod run {
    use std::path::PathBuf;
    use std::sync::Arc;

    use anyhow::{Context, Result};
    use log::info;

    use crate::channels::get_channel_by_name;
    use crate::checker::LinkChecker;
    use crate::config::Config;
    use crate::error_handling::ErrorStats;
    use crate::initialization::init_client;
    use crate::storage::{create_tables, init_db_pool};

    /// Results of a full checking run.
    #[derive(Debug, Clone)]
    pub struct CheckReport {
        /// Number of links pulled for checking
        pub total: usize,
        /// Links whose verdict was successful
        pub success: usize,
        /// Links that failed, including panicked or timed-out checks
        pub failed: usize,
        /// Percentage of successful links (0 when the batch was empty)
        pub success_rate: f64,
        /// Path to the SQLite database holding per-link results
        pub db_path: PathBuf,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
    }

    /// Runs a verification pass over every eligible link.
    ///
    /// Opens (or creates) the database, pulls links that are unknown, active,
    /// or never checked (optionally scoped to `config.channel`) and checks
    /// them concurrently, applying each verdict to its persistent record.
    ///
    /// # Errors
    ///
    /// Fails if the database cannot be opened, the HTTP client cannot be
    /// built, or a named channel does not exist. Per-link failures are
    /// reported in the returned counts, never as errors.
    pub async fn run_check(config: Config) -> Result<CheckReport> {
        let start_time = std::time::Instant::now();

        let pool = init_db_pool(&config.db_path)
            .await
            .context("Failed to initialize database pool")?;
        create_tables(&pool)
            .await
            .context("Failed to create tables")?;

        let channel_id = match config.channel.as_deref() {
            Some(name) => {
                let channel = get_channel_by_name(&pool, name)
                    .await
                    .context("Failed to look up channel")?
                    .with_context(|| format!("No such channel: {name}"))?;
                info!("Checking links for channel {} (id {})", channel.name, channel.id);
                Some(channel.id)
            }
            None => None,
        };

        let client = init_client(&config).context("Failed to initialize HTTP client")?;
        let error_stats = Arc::new(ErrorStats::new());
        let checker = Arc::new(LinkChecker::new(
            client,
            Arc::clone(&pool),
            &config,
            Arc::clone(&error_stats),
        ));

        let report = checker.check_all(channel_id, config.limit).await?;
        error_stats.log_summary();

        Ok(CheckReport {
            total: report.total,
            success: report.success,
            failed: report.failed,
            success_rate: report.success_rate,
            db_path: config.db_path.clone(),
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        })
    }
}
