//! Media stream probe.
//!
//! Runs ffprobe against a candidate URL with analysis bounds tuned for live
//! sources, parses its JSON payload, and turns the technical metadata into
//! deterministic 1-10 quality sub-scores. A missing ffprobe binary is a
//! degrade signal ([`MediaProbeOutcome::Unavailable`]), never an error.

use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::config::{FFPROBE_ANALYZE_DURATION, FFPROBE_PROBE_SIZE};
use crate::probe::result::{ProbeKind, ProbeResult};
use crate::process::{self, SpawnError};

/// Outcome of a media probe attempt.
pub enum MediaProbeOutcome {
    /// ffprobe ran (successfully or not); the result captures what happened.
    Probed(ProbeResult),
    /// ffprobe is not installed; callers must skip media probing, not fail.
    Unavailable,
}

#[derive(Deserialize)]
struct FfprobePayload {
    #[serde(default)]
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Deserialize, Default)]
struct FfprobeFormat {
    duration: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Deserialize, Default)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u64>,
    height: Option<u64>,
    r_frame_rate: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u64>,
}

/// Probes `url` with ffprobe under a hard wall-clock limit.
///
/// On timeout the process is killed and a failure flagged `is_timeout` is
/// returned. Non-zero exit carries the captured stderr; malformed JSON yields
/// a parse-error failure.
pub async fn probe_media(url: &str, timeout: Duration) -> MediaProbeOutcome {
    let args = [
        "-v",
        "quiet",
        "-print_format",
        "json",
        "-show_format",
        "-show_streams",
        "-analyzeduration",
        FFPROBE_ANALYZE_DURATION,
        "-probesize",
        FFPROBE_PROBE_SIZE,
        url,
    ];

    let start = Instant::now();
    let handle = match process::spawn("ffprobe", &args) {
        Ok(handle) => handle,
        Err(SpawnError::NotFound(_)) => return MediaProbeOutcome::Unavailable,
        Err(SpawnError::Io(program, e)) => {
            return MediaProbeOutcome::Probed(ProbeResult::failure(
                ProbeKind::Media,
                start.elapsed(),
                format!("failed to start {program}: {e}"),
            ));
        }
    };

    let output = match handle.wait_with_timeout(timeout).await {
        Ok(Some(output)) => output,
        Ok(None) => {
            return MediaProbeOutcome::Probed(ProbeResult::timeout(
                ProbeKind::Media,
                start.elapsed(),
                "media probe timed out",
            ));
        }
        Err(e) => {
            return MediaProbeOutcome::Probed(ProbeResult::failure(
                ProbeKind::Media,
                start.elapsed(),
                format!("media probe wait failed: {e}"),
            ));
        }
    };

    if !output.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            "media probe failed".to_string()
        } else {
            stderr
        };
        return MediaProbeOutcome::Probed(ProbeResult::failure(
            ProbeKind::Media,
            start.elapsed(),
            message,
        ));
    }

    MediaProbeOutcome::Probed(parse_payload(&output.stdout, start.elapsed()))
}

/// Parses the ffprobe JSON payload into a scored [`ProbeResult`].
fn parse_payload(stdout: &[u8], elapsed: Duration) -> ProbeResult {
    let payload: FfprobePayload = match serde_json::from_slice(stdout) {
        Ok(payload) => payload,
        Err(e) => {
            return ProbeResult::failure(
                ProbeKind::Media,
                elapsed,
                format!("failed to parse media probe output: {e}"),
            );
        }
    };

    let video = payload
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));
    let audio = payload
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"));

    let duration = payload
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok());
    let bitrate = payload
        .format
        .bit_rate
        .as_deref()
        .and_then(|b| b.parse::<u64>().ok());

    let resolution = video.and_then(|s| match (s.width, s.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Some(format!("{w}x{h}")),
        _ => None,
    });
    let fps = video.map(|s| parse_frame_rate(s.r_frame_rate.as_deref()));

    let video_quality = video_quality_score(video);
    let audio_quality = audio_quality_score(audio);
    let stability = stability_score(bitrate, payload.streams.len());
    let overall = (video_quality as u16 + audio_quality as u16 + stability as u16) / 3;

    let mut result = ProbeResult::success(ProbeKind::Media, elapsed);
    result.video_codec = video.and_then(|s| s.codec_name.clone());
    result.audio_codec = audio.and_then(|s| s.codec_name.clone());
    result.resolution = resolution;
    result.bitrate = bitrate;
    result.fps = fps;
    result.duration_secs = duration;
    result.video_quality = Some(video_quality);
    result.audio_quality = Some(audio_quality);
    result.stability_score = Some(stability);
    result.overall_score = Some(overall as u8);
    result
}

/// Parses an ffprobe rational frame rate ("num/den"); malformed input or a
/// zero denominator yields 0.
fn parse_frame_rate(raw: Option<&str>) -> f64 {
    let raw = match raw {
        Some(raw) => raw,
        None => return 0.0,
    };
    let (num, den) = match raw.split_once('/') {
        Some((num, den)) => (num, den),
        None => return raw.parse::<f64>().unwrap_or(0.0),
    };
    match (num.trim().parse::<f64>(), den.trim().parse::<f64>()) {
        (Ok(num), Ok(den)) if den != 0.0 => num / den,
        _ => 0.0,
    }
}

fn clamp_score(score: i32) -> u8 {
    score.clamp(1, 10) as u8
}

/// Video sub-score: base 5, resolution tier (+3 for 1080, +2 for 720, +1 for
/// 480) and frame rate (+2 at 50fps, +1 at 30fps). No video stream scores a
/// flat 1.
fn video_quality_score(video: Option<&FfprobeStream>) -> u8 {
    let video = match video {
        Some(video) => video,
        None => return 1,
    };

    let mut score = 5i32;
    let height = video.height.unwrap_or(0);
    if height >= 1080 {
        score += 3;
    } else if height >= 720 {
        score += 2;
    } else if height >= 480 {
        score += 1;
    }

    let fps = parse_frame_rate(video.r_frame_rate.as_deref());
    if fps >= 50.0 {
        score += 2;
    } else if fps >= 30.0 {
        score += 1;
    }

    clamp_score(score)
}

/// Audio sub-score: base 5, sample rate (+2 at 48kHz, +1 at 44.1kHz) and
/// channel count (+2 for 5.1, +1 for stereo). No audio stream scores a flat 1.
fn audio_quality_score(audio: Option<&FfprobeStream>) -> u8 {
    let audio = match audio {
        Some(audio) => audio,
        None => return 1,
    };

    let mut score = 5i32;
    let sample_rate = audio
        .sample_rate
        .as_deref()
        .and_then(|r| r.parse::<u64>().ok())
        .unwrap_or(0);
    if sample_rate >= 48000 {
        score += 2;
    } else if sample_rate >= 44100 {
        score += 1;
    }

    let channels = audio.channels.unwrap_or(0);
    if channels >= 6 {
        score += 2;
    } else if channels >= 2 {
        score += 1;
    }

    clamp_score(score)
}

/// Stability sub-score: base 5, +2 when the container reports a positive
/// bitrate, +1 when at least two streams are present.
fn stability_score(bitrate: Option<u64>, stream_count: usize) -> u8 {
    let mut score = 5i32;
    if bitrate.is_some_and(|b| b > 0) {
        score += 2;
    }
    if stream_count >= 2 {
        score += 1;
    }
    clamp_score(score)
}
