//! Batch link verification.
//!
//! Drives the per-link chain (HTTP probe, media probe, merge, state
//! transition) across many links concurrently, bounded by a semaphore. One
//! link's failure, including a panic inside its task, is isolated and
//! counted; it never aborts sibling checks or the batch.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{debug, info, warn};
use sqlx::SqlitePool;
use tokio::sync::Semaphore;

use crate::config::{Config, LINK_PROCESSING_TIMEOUT};
use crate::error_handling::{ErrorStats, ErrorType};
use crate::probe::{self, HttpProbeConfig, MediaProbeOutcome, ProbeResult, Verdict};
use crate::state;
use crate::storage::models::LinkRecord;
use crate::storage::queries::{query_links_for_check, record_probe_history};

/// Aggregate outcome of a batch check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchReport {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub success_rate: f64,
}

impl BatchReport {
    fn new(total: usize, success: usize, failed: usize) -> Self {
        let success_rate = if total > 0 {
            (success as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        BatchReport {
            total,
            success,
            failed,
            success_rate,
        }
    }

    fn empty() -> Self {
        BatchReport::new(0, 0, 0)
    }
}

/// Shared context for a checking run: one HTTP client, one pool, one error
/// tally, and the latched media-probe availability flag.
pub struct LinkChecker {
    client: Arc<reqwest::Client>,
    pool: Arc<SqlitePool>,
    http_config: HttpProbeConfig,
    media_timeout: Duration,
    max_concurrency: usize,
    /// Cleared the first time ffprobe turns out to be missing; media probing
    /// is then skipped for the remainder of the run instead of re-attempted
    /// per link.
    media_available: AtomicBool,
    error_stats: Arc<ErrorStats>,
}

impl LinkChecker {
    pub fn new(
        client: Arc<reqwest::Client>,
        pool: Arc<SqlitePool>,
        config: &Config,
        error_stats: Arc<ErrorStats>,
    ) -> Self {
        LinkChecker {
            client,
            pool,
            http_config: HttpProbeConfig {
                max_retries: config.max_retries,
            },
            media_timeout: Duration::from_secs(config.media_timeout_seconds),
            max_concurrency: config.max_concurrency.max(1),
            media_available: AtomicBool::new(!config.no_media_probe),
            error_stats,
        }
    }

    /// Runs the full verification chain for one link and applies the verdict
    /// to its persistent record. Probe-level failures come back as a failed
    /// verdict; only persistence problems surface as errors.
    pub async fn check_link(&self, link: &LinkRecord) -> anyhow::Result<Verdict> {
        debug!("checking link {} ({})", link.id, link.url);

        let http = probe::probe_http(&self.client, &link.url, &self.http_config).await;
        self.tally_probe(&http);
        if let Err(e) = record_probe_history(&self.pool, link.id, &http).await {
            self.error_stats.increment(ErrorType::PersistenceError);
            warn!("probe history write failed for link {}: {e}", link.id);
        }

        // Media probing is gated on HTTP reachability.
        let media = if http.success && self.media_available.load(Ordering::Acquire) {
            match probe::probe_media(&link.url, self.media_timeout).await {
                MediaProbeOutcome::Unavailable => {
                    if self.media_available.swap(false, Ordering::AcqRel) {
                        warn!("ffprobe not found; skipping media probing for this run");
                    }
                    None
                }
                MediaProbeOutcome::Probed(result) => {
                    self.tally_probe(&result);
                    if let Err(e) = record_probe_history(&self.pool, link.id, &result).await {
                        self.error_stats.increment(ErrorType::PersistenceError);
                        warn!("probe history write failed for link {}: {e}", link.id);
                    }
                    Some(MediaProbeOutcome::Probed(result))
                }
            }
        } else {
            None
        };

        let verdict = probe::merge(http, media);
        state::apply_verdict(&self.pool, link.id, &verdict)
            .await
            .map_err(|e| {
                self.error_stats.increment(ErrorType::PersistenceError);
                anyhow::anyhow!("failed to apply verdict for link {}: {e}", link.id)
            })?;

        Ok(verdict)
    }

    /// Checks a batch of links concurrently and returns aggregate counts.
    ///
    /// Per-link state transitions are applied as a side effect before this
    /// returns. Never raises for per-link failures: panics and unexpected
    /// errors inside a chain are caught and counted as failures.
    pub async fn check_batch(self: &Arc<Self>, links: Vec<LinkRecord>) -> BatchReport {
        if links.is_empty() {
            return BatchReport::empty();
        }

        let total = links.len();
        info!("checking {total} links (max {} in flight)", self.max_concurrency);

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let success_count = Arc::new(AtomicUsize::new(0));
        let failed_count = Arc::new(AtomicUsize::new(0));

        let mut tasks = FuturesUnordered::new();
        for link in links {
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    warn!("semaphore closed, skipping link {}", link.id);
                    failed_count.fetch_add(1, Ordering::SeqCst);
                    continue;
                }
            };

            let checker = Arc::clone(self);
            let success_count = Arc::clone(&success_count);
            let failed_count = Arc::clone(&failed_count);

            tasks.push(tokio::spawn(async move {
                let _permit = permit;
                let result =
                    tokio::time::timeout(LINK_PROCESSING_TIMEOUT, checker.check_link(&link)).await;
                match result {
                    Ok(Ok(verdict)) if verdict.success() => {
                        success_count.fetch_add(1, Ordering::SeqCst);
                    }
                    Ok(Ok(_)) => {
                        failed_count.fetch_add(1, Ordering::SeqCst);
                    }
                    Ok(Err(e)) => {
                        failed_count.fetch_add(1, Ordering::SeqCst);
                        warn!("check failed for {}: {e}", link.url);
                    }
                    Err(_) => {
                        failed_count.fetch_add(1, Ordering::SeqCst);
                        checker.error_stats.increment(ErrorType::LinkCheckTimeout);
                        warn!(
                            "check of {} exceeded {}s, counted as failure",
                            link.url,
                            LINK_PROCESSING_TIMEOUT.as_secs()
                        );
                    }
                }
            }));
        }

        while let Some(task_result) = tasks.next().await {
            if let Err(join_error) = task_result {
                failed_count.fetch_add(1, Ordering::SeqCst);
                self.error_stats.increment(ErrorType::LinkCheckPanic);
                warn!("link check task panicked: {join_error:?}");
            }
        }

        let success = success_count.load(Ordering::SeqCst);
        let failed = failed_count.load(Ordering::SeqCst);
        info!("batch finished: {success} succeeded, {failed} failed");

        BatchReport::new(total, success, failed)
    }

    /// Checks every link eligible for verification, optionally scoped to one
    /// channel. `limit` of 0 means no limit.
    pub async fn check_all(
        self: &Arc<Self>,
        channel_id: Option<i64>,
        limit: u32,
    ) -> anyhow::Result<BatchReport> {
        let links = query_links_for_check(&self.pool, channel_id, limit).await?;
        Ok(self.check_batch(links).await)
    }

    fn tally_probe(&self, result: &ProbeResult) {
        if result.success {
            return;
        }
        let error_type = match result.kind {
            crate::probe::ProbeKind::Http => {
                if result.is_timeout {
                    ErrorType::NetworkTimeoutError
                } else if result.http_status.is_some() {
                    ErrorType::HttpStatusError
                } else {
                    ErrorType::NetworkTransportError
                }
            }
            crate::probe::ProbeKind::Media => {
                if result.is_timeout {
                    ErrorType::MediaProbeTimeout
                } else if result
                    .error_message
                    .as_deref()
                    .is_some_and(|m| m.contains("parse"))
                {
                    ErrorType::MediaProbeParseError
                } else {
                    ErrorType::MediaProbeProcessError
                }
            }
        };
        self.error_stats.increment(error_type);
    }
}
