//! Result merging.
//!
//! Combines the HTTP and media probe outcomes into a single verdict. HTTP is
//! the gating signal: an unreachable link fails outright, while a reachable
//! link stays usable even when the media probe degrades or is unavailable,
//! just at reduced confidence.

use crate::config::{SCORE_MEDIA_PROBE_FAILED, SCORE_NO_MEDIA_DETAIL};
use crate::probe::media::MediaProbeOutcome;
use crate::probe::result::ProbeResult;

/// The merged, final probe outcome for one check cycle, ready to drive a
/// persistent status update.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub result: ProbeResult,
    /// Persisted quality score (0-100 column). Holds the media probe's
    /// 1-10 overall score, or the fixed 6/4 fallbacks when media detail is
    /// missing or degraded.
    pub quality_score: i64,
}

impl Verdict {
    pub fn success(&self) -> bool {
        self.result.success
    }
}

/// Applies the combination table:
///
/// | HTTP | media | verdict |
/// |------|-------|---------|
/// | fail | any   | fail, HTTP failure fields |
/// | ok   | none/unavailable | ok, score 6 |
/// | ok   | fail  | ok, score 4, no error surfaced |
/// | ok   | ok    | ok, media fields + media score |
pub fn merge(http: ProbeResult, media: Option<MediaProbeOutcome>) -> Verdict {
    if !http.success {
        return Verdict {
            result: http,
            quality_score: 0,
        };
    }

    let media_result = match media {
        Some(MediaProbeOutcome::Probed(result)) => result,
        Some(MediaProbeOutcome::Unavailable) | None => {
            return Verdict {
                result: http,
                quality_score: SCORE_NO_MEDIA_DETAIL,
            };
        }
    };

    if !media_result.success {
        // Reachable but opaque to ffprobe: still usable, lower confidence.
        // The media error is deliberately not surfaced on the verdict.
        return Verdict {
            result: http,
            quality_score: SCORE_MEDIA_PROBE_FAILED,
        };
    }

    let mut merged = http;
    merged.video_codec = media_result.video_codec;
    merged.audio_codec = media_result.audio_codec;
    merged.resolution = media_result.resolution;
    merged.bitrate = media_result.bitrate;
    merged.fps = media_result.fps;
    merged.duration_secs = media_result.duration_secs;
    merged.video_quality = media_result.video_quality;
    merged.audio_quality = media_result.audio_quality;
    merged.stability_score = media_result.stability_score;
    merged.overall_score = media_result.overall_score;

    let quality_score = media_result.overall_score.unwrap_or(0) as i64;
    Verdict {
        result: merged,
        quality_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::result::ProbeKind;
    use std::time::Duration;

    fn http_ok() -> ProbeResult {
        let mut result = ProbeResult::success(ProbeKind::Http, Duration::from_millis(80));
        result.http_status = Some(200);
        result.content_type = Some("application/vnd.apple.mpegurl".into());
        result
    }

    fn media_ok(score: u8) -> ProbeResult {
        let mut result = ProbeResult::success(ProbeKind::Media, Duration::from_secs(3));
        result.video_codec = Some("h264".into());
        result.resolution = Some("1920x1080".into());
        result.overall_score = Some(score);
        result
    }

    #[test]
    fn http_failure_gates_everything() {
        let http = ProbeResult::failure(ProbeKind::Http, Duration::from_secs(1), "HTTP error: 404");
        let verdict = merge(http, Some(MediaProbeOutcome::Probed(media_ok(9))));
        assert!(!verdict.success());
        assert_eq!(verdict.quality_score, 0);
        assert_eq!(verdict.result.error_message.as_deref(), Some("HTTP error: 404"));
    }

    #[test]
    fn media_unavailable_yields_moderate_score() {
        let verdict = merge(http_ok(), Some(MediaProbeOutcome::Unavailable));
        assert!(verdict.success());
        assert_eq!(verdict.quality_score, 6);
        assert!(verdict.result.video_codec.is_none());
    }

    #[test]
    fn skipped_media_probe_yields_moderate_score() {
        let verdict = merge(http_ok(), None);
        assert!(verdict.success());
        assert_eq!(verdict.quality_score, 6);
    }

    #[test]
    fn media_failure_degrades_without_surfacing_error() {
        let media =
            ProbeResult::failure(ProbeKind::Media, Duration::from_secs(15), "probe failed");
        let verdict = merge(http_ok(), Some(MediaProbeOutcome::Probed(media)));
        assert!(verdict.success());
        assert_eq!(verdict.quality_score, 4);
        assert!(verdict.result.error_message.is_none());
    }

    #[test]
    fn media_success_copies_fields_and_score() {
        let verdict = merge(http_ok(), Some(MediaProbeOutcome::Probed(media_ok(9))));
        assert!(verdict.success());
        assert_eq!(verdict.quality_score, 9);
        assert_eq!(verdict.result.video_codec.as_deref(), Some("h264"));
        assert_eq!(verdict.result.resolution.as_deref(), Some("1920x1080"));
        // HTTP fields survive the merge
        assert_eq!(verdict.result.http_status, Some(200));
    }
}
