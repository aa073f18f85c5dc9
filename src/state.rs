//! Link status state machine.
//!
//! A link's persistent status changes only through this module. Every check
//! produces a verdict; the transition applies it to a freshly fetched row so
//! concurrent sibling checks never act on a stale snapshot. No status is
//! terminal; every link stays eligible for re-probing.

use chrono::Utc;
use sqlx::SqlitePool;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::config::FAIL_INVALIDATION_THRESHOLD;
use crate::error_handling::DatabaseError;
use crate::probe::Verdict;
use crate::storage::models::LinkRecord;
use crate::storage::queries::fetch_link;

/// Persistent link status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum LinkStatus {
    Unknown,
    Active,
    Inactive,
    Error,
    Timeout,
    Forbidden,
}

/// Applies a verdict to an in-memory link row.
///
/// Success: status becomes `Active`, the link is marked valid, and the
/// verdict's quality fields are copied onto the row. Failure: the counter and
/// error message are updated, the status reflects the failure mode (timeout,
/// 403, or generic error), and reaching the accumulated-failure threshold
/// forces `is_valid = false` regardless of the status label. A failed verdict
/// never overwrites a previously stored quality score.
pub fn apply_transition(record: &mut LinkRecord, verdict: &Verdict, now_millis: i64) {
    record.check_count += 1;
    record.last_checked = Some(now_millis);

    if verdict.success() {
        record.status = LinkStatus::Active.as_ref().to_string();
        record.is_valid = true;
        record.success_count += 1;
        record.last_success = Some(now_millis);
        record.response_time = Some(verdict.result.elapsed.as_secs_f64());
        record.http_status = verdict.result.http_status.map(|s| s as i64);
        record.content_type = verdict.result.content_type.clone();
        record.quality_score = verdict.quality_score;
        record.resolution = verdict.result.resolution.clone();
        record.codec = verdict.result.video_codec.clone();
        record.bitrate = verdict.result.bitrate.map(|b| b as i64);
        record.fps = verdict.result.fps;
        record.error_message = None;
        return;
    }

    record.fail_count += 1;
    record.error_message = verdict.result.error_message.clone();
    record.http_status = verdict.result.http_status.map(|s| s as i64);

    let status = if verdict.result.is_timeout {
        LinkStatus::Timeout
    } else if verdict.result.http_status == Some(403) {
        LinkStatus::Forbidden
    } else {
        LinkStatus::Error
    };
    record.status = status.as_ref().to_string();

    // Accumulated failures invalidate the link whatever the label says.
    if record.fail_count >= FAIL_INVALIDATION_THRESHOLD {
        record.is_valid = false;
    }
}

/// Re-fetches the link row and applies the verdict to it, persisting the
/// result. The fetch happens immediately before the mutation so concurrent
/// updates from sibling checks are observed.
pub async fn apply_verdict(
    pool: &SqlitePool,
    link_id: i64,
    verdict: &Verdict,
) -> Result<LinkRecord, DatabaseError> {
    let mut record = fetch_link(pool, link_id).await?;
    apply_transition(&mut record, verdict, Utc::now().timestamp_millis());

    sqlx::query(
        "UPDATE links SET
            status = ?, response_time = ?, http_status = ?, content_type = ?,
            resolution = ?, codec = ?, bitrate = ?, fps = ?, quality_score = ?,
            check_count = ?, success_count = ?, fail_count = ?, is_valid = ?,
            last_checked = ?, last_success = ?, error_message = ?
         WHERE id = ?",
    )
    .bind(&record.status)
    .bind(record.response_time)
    .bind(record.http_status)
    .bind(&record.content_type)
    .bind(&record.resolution)
    .bind(&record.codec)
    .bind(record.bitrate)
    .bind(record.fps)
    .bind(record.quality_score)
    .bind(record.check_count)
    .bind(record.success_count)
    .bind(record.fail_count)
    .bind(record.is_valid)
    .bind(record.last_checked)
    .bind(record.last_success)
    .bind(&record.error_message)
    .bind(record.id)
    .execute(pool)
    .await?;

    Ok(record)
}
