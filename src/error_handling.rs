use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// A row that was expected to exist was not found.
    #[error("Link not found: id {0}")]
    LinkNotFound(i64),
}

/// Categories of failure seen while checking links.
///
/// Probe-level failures are captured into `ProbeResult` values rather than
/// propagated; this enum exists so the run can tally what went wrong for the
/// end-of-run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    NetworkTransportError,
    NetworkTimeoutError,
    HttpStatusError,
    MediaProbeTimeout,
    MediaProbeProcessError,
    MediaProbeParseError,
    PersistenceError,
    LinkCheckPanic,
    LinkCheckTimeout,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::NetworkTransportError => "Network transport error",
            ErrorType::NetworkTimeoutError => "Network timeout",
            ErrorType::HttpStatusError => "HTTP status error",
            ErrorType::MediaProbeTimeout => "Media probe timeout",
            ErrorType::MediaProbeProcessError => "Media probe process error",
            ErrorType::MediaProbeParseError => "Media probe parse error",
            ErrorType::PersistenceError => "Persistence error",
            ErrorType::LinkCheckPanic => "Link check panicked",
            ErrorType::LinkCheckTimeout => "Link check timed out",
        }
    }
}

/// Thread-safe error statistics tracker.
///
/// Tracks the count of each error type using atomic counters, allowing
/// concurrent access from multiple tasks. All error types are initialized to
/// zero on creation, so `increment`/`get_count` never miss a key.
pub struct ErrorStats {
    errors: HashMap<ErrorType, AtomicUsize>,
}

impl ErrorStats {
    pub fn new() -> Self {
        let mut errors = HashMap::new();
        for error in ErrorType::iter() {
            errors.insert(error, AtomicUsize::new(0));
        }
        ErrorStats { errors }
    }

    pub fn increment(&self, error: ErrorType) {
        // All ErrorType variants are initialized in new(), so unwrap() is safe
        self.errors
            .get(&error)
            .unwrap()
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_count(&self, error: ErrorType) -> usize {
        self.errors.get(&error).unwrap().load(Ordering::SeqCst)
    }

    /// Logs a summary line for every error type with a non-zero count.
    pub fn log_summary(&self) {
        for error in ErrorType::iter() {
            let count = self.get_count(error);
            if count > 0 {
                log::info!("{}: {}", error.as_str(), count);
            }
        }
    }
}

impl Default for ErrorStats {
    fn default() -> Self {
        Self::new()
    }
}
