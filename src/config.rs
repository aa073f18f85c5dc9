use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

// constants (used as defaults)
pub const DB_PATH: &str = "./stream_status.db";

/// Per-link timeout covering the full HTTP + media probe chain.
pub const LINK_PROCESSING_TIMEOUT: Duration = Duration::from_secs(60);

/// Total timeout applied by the shared HTTP client to each request.
pub const HTTP_TIMEOUT_SECS: u64 = 10;

/// Wall-clock limit for a single ffprobe invocation.
pub const MEDIA_PROBE_TIMEOUT_SECS: u64 = 15;

// Retry policy for the HTTP probe
/// Additional attempts after the first one when a 503 is observed.
pub const HTTP_MAX_RETRIES: u32 = 1;
/// Base backoff for 503 responses; multiplied by the attempt number.
pub const HTTP_RETRY_BACKOFF: Duration = Duration::from_secs(2);
/// Fixed backoff before the single timeout retry.
pub const HTTP_TIMEOUT_RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Byte range requested on the GET fallback; live sources rarely honor
/// Content-Length, so one KiB is enough to prove the stream emits data.
pub const RANGE_PROBE_BYTES: u64 = 1024;

// ffprobe bounds tuned for live sources
/// Analysis window handed to ffprobe, in microseconds (5 seconds).
pub const FFPROBE_ANALYZE_DURATION: &str = "5000000";
/// Probe size handed to ffprobe, in bytes (5 MB).
pub const FFPROBE_PROBE_SIZE: &str = "5000000";

/// Accumulated failures after which a link is marked invalid.
pub const FAIL_INVALIDATION_THRESHOLD: i64 = 3;

// Fallback scores used by the result merger when media detail is missing.
/// Reachable link, media probe unavailable: moderate confidence.
pub const SCORE_NO_MEDIA_DETAIL: i64 = 6;
/// Reachable link, media probe failed: reduced confidence.
pub const SCORE_MEDIA_PROBE_FAILED: i64 = 4;

/// Default User-Agent string for HTTP requests.
///
/// A generic Chrome-like string; some IPTV hosts reject requests without a
/// browser-looking agent. Users can override this via the `--user-agent` flag.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Logging level for the application.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Plain,
    Json,
}

/// Command-line options and configuration.
///
/// All options have sensible defaults and can be overridden via command-line
/// flags.
///
/// # Examples
///
/// ```bash
/// # Check every pending link
/// stream_status
///
/// # Check one channel's links with higher concurrency
/// stream_status --channel CCTV1 --max-concurrency 50
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "stream_status",
    about = "Checks candidate streaming links for reachability and stream quality."
)]
pub struct Config {
    /// Only check links belonging to this channel name
    #[arg(long)]
    pub channel: Option<String>,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Database path (SQLite file)
    #[arg(long, value_parser, default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// Maximum concurrent link checks
    #[arg(long, default_value_t = 20)]
    pub max_concurrency: usize,

    /// Per-request HTTP timeout in seconds
    #[arg(long, default_value_t = HTTP_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Wall-clock limit for each ffprobe invocation in seconds
    #[arg(long, default_value_t = MEDIA_PROBE_TIMEOUT_SECS)]
    pub media_timeout_seconds: u64,

    /// Additional HTTP attempts after the first when a 503 is observed
    #[arg(long, default_value_t = HTTP_MAX_RETRIES)]
    pub max_retries: u32,

    /// Maximum links to pull per run (0 = no limit)
    #[arg(long, default_value_t = 0)]
    pub limit: u32,

    /// Skip the ffprobe media probe even when it is installed
    #[arg(long, default_value_t = false)]
    pub no_media_probe: bool,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Config::parse_from::<_, &str>([])
    }
}
