// storage/schema.rs
// Table creation

use sqlx::{Pool, Sqlite};

use crate::error_handling::DatabaseError;

/// Creates the `channels`, `links`, and `check_results` tables if they don't
/// exist.
pub async fn create_tables(pool: &Pool<Sqlite>) -> Result<(), DatabaseError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS channels (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            keywords TEXT NOT NULL DEFAULT '[]',
            category TEXT,
            priority INTEGER NOT NULL DEFAULT 5,
            is_active INTEGER NOT NULL DEFAULT 1
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS links (
            id INTEGER PRIMARY KEY,
            channel_id INTEGER NOT NULL REFERENCES channels(id),
            url TEXT NOT NULL,
            source TEXT,
            status TEXT NOT NULL DEFAULT 'unknown',
            response_time REAL,
            http_status INTEGER,
            content_type TEXT,
            resolution TEXT,
            codec TEXT,
            bitrate INTEGER,
            fps REAL,
            quality_score INTEGER NOT NULL DEFAULT 0,
            check_count INTEGER NOT NULL DEFAULT 0,
            success_count INTEGER NOT NULL DEFAULT 0,
            fail_count INTEGER NOT NULL DEFAULT 0,
            is_valid INTEGER NOT NULL DEFAULT 0,
            first_found INTEGER NOT NULL,
            last_checked INTEGER,
            last_success INTEGER,
            error_message TEXT,
            UNIQUE(channel_id, url)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS check_results (
            id INTEGER PRIMARY KEY,
            link_id INTEGER NOT NULL REFERENCES links(id),
            check_type TEXT NOT NULL,
            is_success INTEGER NOT NULL,
            is_timeout INTEGER NOT NULL,
            response_time REAL NOT NULL,
            http_status INTEGER,
            content_type TEXT,
            video_codec TEXT,
            audio_codec TEXT,
            resolution TEXT,
            bitrate INTEGER,
            fps REAL,
            duration REAL,
            video_quality INTEGER,
            audio_quality INTEGER,
            stability_score INTEGER,
            overall_score INTEGER,
            error_message TEXT,
            check_time INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_links_channel ON links(channel_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_links_status ON links(status)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_check_results_link ON check_results(link_id)")
        .execute(pool)
        .await?;

    Ok(())
}
