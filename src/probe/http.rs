//! HTTP reachability probe.
//!
//! Live stream endpoints are awkward HTTP citizens: many reject HEAD, some
//! only answer ranged GETs, and Content-Length is usually meaningless. The
//! probe therefore tries HEAD first and falls back to a GET for the first KiB,
//! treating one received byte as proof of life.

use std::time::{Duration, Instant};

use log::debug;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, RANGE};
use reqwest::StatusCode;

use crate::config::{HTTP_RETRY_BACKOFF, HTTP_TIMEOUT_RETRY_BACKOFF, RANGE_PROBE_BYTES};
use crate::probe::result::{ProbeKind, ProbeResult};

/// Tuning for a single [`probe_http`] call. The shared client carries the
/// user-agent, redirect policy, and total-timeout bound.
#[derive(Debug, Clone, Copy)]
pub struct HttpProbeConfig {
    /// Additional attempts after the first when a 503 is observed.
    pub max_retries: u32,
}

impl Default for HttpProbeConfig {
    fn default() -> Self {
        HttpProbeConfig {
            max_retries: crate::config::HTTP_MAX_RETRIES,
        }
    }
}

/// Probes a URL for HTTP-level reachability.
///
/// Protocol: HEAD (redirects followed): 200 is a success, 405/501 fall
/// through to a ranged GET, any other status is a failure. A HEAD transport
/// or timeout error also falls through to the GET, which needs a 200/206 and
/// at least one body byte. Retry policy: 503 is retried up to
/// `config.max_retries` times with linearly increasing backoff, a timeout is
/// retried once after a fixed backoff, nothing else is retried.
///
/// Never returns an error: every failure mode is captured into the
/// [`ProbeResult`].
pub async fn probe_http(
    client: &reqwest::Client,
    url: &str,
    config: &HttpProbeConfig,
) -> ProbeResult {
    let mut attempt: u32 = 0;
    let mut timeout_retried = false;

    loop {
        attempt += 1;
        let result = probe_http_once(client, url).await;
        if result.success {
            return result;
        }

        if result.http_status == Some(503) && attempt <= config.max_retries {
            let backoff = HTTP_RETRY_BACKOFF * attempt;
            debug!("503 from {url}, retrying in {}s", backoff.as_secs());
            tokio::time::sleep(backoff).await;
            continue;
        }
        if result.is_timeout && !timeout_retried {
            timeout_retried = true;
            debug!(
                "timeout probing {url}, retrying once in {}s",
                HTTP_TIMEOUT_RETRY_BACKOFF.as_secs()
            );
            tokio::time::sleep(HTTP_TIMEOUT_RETRY_BACKOFF).await;
            continue;
        }

        return result;
    }
}

/// One pass of the HEAD-then-ranged-GET protocol.
async fn probe_http_once(client: &reqwest::Client, url: &str) -> ProbeResult {
    let start = Instant::now();

    match client.head(url).send().await {
        Ok(resp) => {
            let status = resp.status();
            if status == StatusCode::OK {
                return success_from_headers(&resp, start.elapsed());
            }
            if status != StatusCode::METHOD_NOT_ALLOWED && status != StatusCode::NOT_IMPLEMENTED {
                return failure_from_status(status, start.elapsed());
            }
            // 405/501: HEAD unsupported, not a failure; try the ranged GET.
        }
        Err(e) if e.is_timeout() => {
            // Fall through to the GET; some servers stall on HEAD but serve
            // ranged GETs promptly.
            debug!("HEAD timed out for {url}, falling back to GET");
        }
        Err(e) => {
            debug!("HEAD failed for {url} ({e}), falling back to GET");
        }
    }

    ranged_get(client, url, start).await
}

async fn ranged_get(client: &reqwest::Client, url: &str, start: Instant) -> ProbeResult {
    let range = format!("bytes=0-{}", RANGE_PROBE_BYTES - 1);
    let resp = match client.get(url).header(RANGE, range).send().await {
        Ok(resp) => resp,
        Err(e) if e.is_timeout() => {
            return ProbeResult::timeout(ProbeKind::Http, start.elapsed(), "request timed out");
        }
        Err(e) => {
            let mut result =
                ProbeResult::failure(ProbeKind::Http, start.elapsed(), format!("request failed: {e}"));
            result.http_status = e.status().map(|s| s.as_u16());
            return result;
        }
    };

    let status = resp.status();
    if status != StatusCode::OK && status != StatusCode::PARTIAL_CONTENT {
        return failure_from_status(status, start.elapsed());
    }

    let content_type = header_string(&resp, CONTENT_TYPE);
    let content_length = header_string(&resp, CONTENT_LENGTH).and_then(|v| v.parse().ok());

    match resp.bytes().await {
        Ok(bytes) if !bytes.is_empty() => {
            let mut result = ProbeResult::success(ProbeKind::Http, start.elapsed());
            result.http_status = Some(status.as_u16());
            result.content_type = content_type;
            result.content_length = content_length.or(Some(bytes.len() as u64));
            result
        }
        Ok(_) => {
            let mut result = ProbeResult::failure(
                ProbeKind::Http,
                start.elapsed(),
                "empty response body",
            );
            result.http_status = Some(status.as_u16());
            result
        }
        Err(e) if e.is_timeout() => {
            ProbeResult::timeout(ProbeKind::Http, start.elapsed(), "request timed out")
        }
        Err(e) => {
            let mut result = ProbeResult::failure(
                ProbeKind::Http,
                start.elapsed(),
                format!("body read failed: {e}"),
            );
            result.http_status = Some(status.as_u16());
            result
        }
    }
}

fn success_from_headers(resp: &reqwest::Response, elapsed: Duration) -> ProbeResult {
    let mut result = ProbeResult::success(ProbeKind::Http, elapsed);
    result.http_status = Some(resp.status().as_u16());
    result.content_type = header_string(resp, CONTENT_TYPE);
    result.content_length = header_string(resp, CONTENT_LENGTH).and_then(|v| v.parse().ok());
    result
}

fn failure_from_status(status: StatusCode, elapsed: Duration) -> ProbeResult {
    let mut result = ProbeResult::failure(
        ProbeKind::Http,
        elapsed,
        format!("HTTP error: {}", status.as_u16()),
    );
    result.http_status = Some(status.as_u16());
    result
}

fn header_string(resp: &reqwest::Response, name: reqwest::header::HeaderName) -> Option<String> {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
