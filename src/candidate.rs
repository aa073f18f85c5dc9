//! Scraped-candidate handling.
//!
//! A candidate is a raw URL plus the channel label the source site advertised
//! it under. Before anything is persisted, the URL is screened for a supported
//! scheme and classified by stream container, and the label is matched against
//! the channel's keywords by [`crate::matcher::matches`].

use url::Url;

/// A scraped URL plus its advertised channel label, not yet verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    pub url: String,
    pub declared_name: String,
    pub source: String,
}

/// Stream container/protocol classification for a candidate URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamType {
    Hls,
    Flv,
    Mp4,
    Ts,
    Rtmp,
    Rtsp,
    Unknown,
}

impl StreamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamType::Hls => "hls",
            StreamType::Flv => "flv",
            StreamType::Mp4 => "mp4",
            StreamType::Ts => "ts",
            StreamType::Rtmp => "rtmp",
            StreamType::Rtsp => "rtsp",
            StreamType::Unknown => "unknown",
        }
    }
}

/// Outcome of screening a candidate URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamUrlInfo {
    pub valid: bool,
    pub protocol: Option<String>,
    pub stream_type: Option<StreamType>,
    pub error: Option<String>,
}

const SUPPORTED_SCHEMES: &[&str] = &["http", "https", "rtmp", "rtsp"];

/// Screens a candidate URL: parseable, host present, supported scheme, and a
/// best-effort stream-type classification from the path.
pub fn validate_stream_url(raw: &str) -> StreamUrlInfo {
    if raw.len() < 10 {
        return StreamUrlInfo {
            valid: false,
            protocol: None,
            stream_type: None,
            error: Some("URL too short".to_string()),
        };
    }

    let parsed = match Url::parse(raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            return StreamUrlInfo {
                valid: false,
                protocol: None,
                stream_type: None,
                error: Some(format!("invalid URL: {e}")),
            }
        }
    };

    let scheme = parsed.scheme().to_lowercase();
    if parsed.host_str().is_none() {
        return StreamUrlInfo {
            valid: false,
            protocol: Some(scheme),
            stream_type: None,
            error: Some("URL has no host".to_string()),
        };
    }
    if !SUPPORTED_SCHEMES.contains(&scheme.as_str()) {
        return StreamUrlInfo {
            valid: false,
            protocol: Some(scheme.clone()),
            stream_type: None,
            error: Some(format!("unsupported scheme: {scheme}")),
        };
    }

    let lower = raw.to_lowercase();
    let stream_type = if lower.contains(".m3u8") {
        StreamType::Hls
    } else if lower.contains(".flv") {
        StreamType::Flv
    } else if lower.contains(".mp4") {
        StreamType::Mp4
    } else if lower.contains(".ts") {
        StreamType::Ts
    } else if scheme == "rtmp" {
        StreamType::Rtmp
    } else if scheme == "rtsp" {
        StreamType::Rtsp
    } else {
        StreamType::Unknown
    };

    StreamUrlInfo {
        valid: true,
        protocol: Some(scheme),
        stream_type: Some(stream_type),
        error: None,
    }
}

/// Derives a short source label from the URL's host (e.g. "example" from
/// "cdn.example.com"), falling back to "unknown".
pub fn detect_source(raw: &str) -> String {
    let host = match Url::parse(raw).ok().and_then(|u| u.host_str().map(str::to_string)) {
        Some(host) => host,
        None => return "unknown".to_string(),
    };

    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() >= 2 {
        parts[parts.len() - 2].to_string()
    } else {
        host
    }
}
