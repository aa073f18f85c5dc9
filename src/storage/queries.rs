// storage/queries.rs
// Link queries and probe-history inserts

use chrono::Utc;
use log::error;
use sqlx::SqlitePool;

use crate::candidate::CandidateLink;
use crate::error_handling::DatabaseError;
use crate::probe::ProbeResult;
use crate::state::LinkStatus;
use crate::storage::models::LinkRecord;

/// Fetches one link row by id, fresh from the database.
pub async fn fetch_link(pool: &SqlitePool, link_id: i64) -> Result<LinkRecord, DatabaseError> {
    sqlx::query_as::<_, LinkRecord>("SELECT * FROM links WHERE id = ?")
        .bind(link_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DatabaseError::LinkNotFound(link_id))
}

/// Queries links eligible for checking: unknown or active status, or never
/// checked at all. `limit` of 0 means no limit.
pub async fn query_links_for_check(
    pool: &SqlitePool,
    channel_id: Option<i64>,
    limit: u32,
) -> Result<Vec<LinkRecord>, DatabaseError> {
    let mut sql = String::from(
        "SELECT * FROM links
         WHERE (status IN (?, ?) OR last_checked IS NULL)",
    );
    if channel_id.is_some() {
        sql.push_str(" AND channel_id = ?");
    }
    sql.push_str(" ORDER BY last_checked ASC NULLS FIRST");
    if limit > 0 {
        sql.push_str(" LIMIT ?");
    }

    let mut query = sqlx::query_as::<_, LinkRecord>(&sql)
        .bind(LinkStatus::Unknown.as_ref())
        .bind(LinkStatus::Active.as_ref());
    if let Some(channel_id) = channel_id {
        query = query.bind(channel_id);
    }
    if limit > 0 {
        query = query.bind(limit);
    }

    Ok(query.fetch_all(pool).await?)
}

/// Inserts a scraped candidate as an unchecked link row. Duplicate URLs for
/// the same channel are ignored. Returns true when a new row was created.
pub async fn insert_candidate(
    pool: &SqlitePool,
    channel_id: i64,
    candidate: &CandidateLink,
) -> Result<bool, DatabaseError> {
    let result = sqlx::query(
        "INSERT INTO links (channel_id, url, source, first_found)
         VALUES (?, ?, ?, ?)
         ON CONFLICT(channel_id, url) DO NOTHING",
    )
    .bind(channel_id)
    .bind(&candidate.url)
    .bind(&candidate.source)
    .bind(Utc::now().timestamp_millis())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Appends one raw probe attempt to the `check_results` audit table,
/// independent of the summarized link row.
pub async fn record_probe_history(
    pool: &SqlitePool,
    link_id: i64,
    result: &ProbeResult,
) -> Result<(), DatabaseError> {
    let insert = sqlx::query(
        "INSERT INTO check_results (
            link_id, check_type, is_success, is_timeout, response_time,
            http_status, content_type, video_codec, audio_codec, resolution,
            bitrate, fps, duration, video_quality, audio_quality,
            stability_score, overall_score, error_message, check_time
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(link_id)
    .bind(result.kind.as_str())
    .bind(result.success)
    .bind(result.is_timeout)
    .bind(result.elapsed.as_secs_f64())
    .bind(result.http_status.map(|s| s as i64))
    .bind(&result.content_type)
    .bind(&result.video_codec)
    .bind(&result.audio_codec)
    .bind(&result.resolution)
    .bind(result.bitrate.map(|b| b as i64))
    .bind(result.fps)
    .bind(result.duration_secs)
    .bind(result.video_quality.map(|v| v as i64))
    .bind(result.audio_quality.map(|v| v as i64))
    .bind(result.stability_score.map(|v| v as i64))
    .bind(result.overall_score.map(|v| v as i64))
    .bind(&result.error_message)
    .bind(Utc::now().timestamp_millis())
    .execute(pool)
    .await;

    match insert {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("Failed to record probe history for link {link_id}: {e}");
            Err(e.into())
        }
    }
}
