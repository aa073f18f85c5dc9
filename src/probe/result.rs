//! Probe outcome types.

use std::time::Duration;

/// Which probe produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    Http,
    Media,
}

impl ProbeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeKind::Http => "http",
            ProbeKind::Media => "media",
        }
    }
}

/// Immutable outcome of a single probe attempt.
///
/// A failed probe carries its error in `error_message` instead of propagating
/// it; nothing past the probe boundary ever sees a raw transport error.
/// Invariant: `success` implies `error_message` is `None`.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub kind: ProbeKind,
    pub success: bool,
    pub elapsed: Duration,
    pub http_status: Option<u16>,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub resolution: Option<String>,
    pub bitrate: Option<u64>,
    pub fps: Option<f64>,
    pub duration_secs: Option<f64>,
    /// 1-10
    pub video_quality: Option<u8>,
    /// 1-10
    pub audio_quality: Option<u8>,
    /// 1-10
    pub stability_score: Option<u8>,
    /// 1-10, integer mean of the three sub-scores
    pub overall_score: Option<u8>,
    pub error_message: Option<String>,
    pub is_timeout: bool,
}

impl ProbeResult {
    /// A successful probe with every optional field empty; callers fill in
    /// what they captured.
    pub fn success(kind: ProbeKind, elapsed: Duration) -> Self {
        ProbeResult {
            kind,
            success: true,
            elapsed,
            http_status: None,
            content_type: None,
            content_length: None,
            video_codec: None,
            audio_codec: None,
            resolution: None,
            bitrate: None,
            fps: None,
            duration_secs: None,
            video_quality: None,
            audio_quality: None,
            stability_score: None,
            overall_score: None,
            error_message: None,
            is_timeout: false,
        }
    }

    pub fn failure(kind: ProbeKind, elapsed: Duration, error_message: impl Into<String>) -> Self {
        ProbeResult {
            success: false,
            error_message: Some(error_message.into()),
            ..ProbeResult::success(kind, elapsed)
        }
    }

    pub fn timeout(kind: ProbeKind, elapsed: Duration, error_message: impl Into<String>) -> Self {
        ProbeResult {
            is_timeout: true,
            ..ProbeResult::failure(kind, elapsed, error_message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_has_no_error_message() {
        let result = ProbeResult::success(ProbeKind::Http, Duration::from_millis(120));
        assert!(result.success);
        assert!(result.error_message.is_none());
        assert!(!result.is_timeout);
    }

    #[test]
    fn timeout_is_a_flagged_failure() {
        let result = ProbeResult::timeout(ProbeKind::Media, Duration::from_secs(15), "timed out");
        assert!(!result.success);
        assert!(result.is_timeout);
        assert_eq!(result.error_message.as_deref(), Some("timed out"));
    }
}
