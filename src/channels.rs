//! Channel registry queries.
//!
//! Channels are registered with a set of search keywords; the crawler
//! collaborator uses them with [`crate::matcher::matches`] to filter scraped
//! candidates, and the checker scopes runs to one channel's links.

use sqlx::SqlitePool;

use crate::error_handling::DatabaseError;
use crate::storage::models::Channel;

#[derive(sqlx::FromRow)]
struct ChannelRow {
    id: i64,
    name: String,
    keywords: String,
    category: Option<String>,
    priority: i64,
    is_active: bool,
}

impl ChannelRow {
    fn into_channel(self) -> Channel {
        // keywords column holds a JSON array; a malformed value degrades to
        // an empty list rather than failing the query.
        let keywords = serde_json::from_str(&self.keywords).unwrap_or_default();
        Channel {
            id: self.id,
            name: self.name,
            keywords,
            category: self.category,
            priority: self.priority,
            is_active: self.is_active,
        }
    }
}

/// Lists active channels, optionally restricted to one category, highest
/// priority first.
pub async fn list_active_channels(
    pool: &SqlitePool,
    category: Option<&str>,
) -> Result<Vec<Channel>, DatabaseError> {
    let rows = match category {
        Some(category) => {
            sqlx::query_as::<_, ChannelRow>(
                "SELECT id, name, keywords, category, priority, is_active
                 FROM channels WHERE is_active = 1 AND category = ?
                 ORDER BY priority DESC, name ASC",
            )
            .bind(category)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, ChannelRow>(
                "SELECT id, name, keywords, category, priority, is_active
                 FROM channels WHERE is_active = 1
                 ORDER BY priority DESC, name ASC",
            )
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows.into_iter().map(ChannelRow::into_channel).collect())
}

/// Looks up a single channel by its exact name.
pub async fn get_channel_by_name(
    pool: &SqlitePool,
    name: &str,
) -> Result<Option<Channel>, DatabaseError> {
    let row = sqlx::query_as::<_, ChannelRow>(
        "SELECT id, name, keywords, category, priority, is_active
         FROM channels WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(ChannelRow::into_channel))
}

/// Registers a channel, updating keywords/category/priority when the name
/// already exists. Returns the channel id.
pub async fn upsert_channel(
    pool: &SqlitePool,
    name: &str,
    keywords: &[String],
    category: Option<&str>,
    priority: i64,
) -> Result<i64, DatabaseError> {
    let keywords_json = serde_json::to_string(keywords).unwrap_or_else(|_| "[]".to_string());
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO channels (name, keywords, category, priority)
         VALUES (?, ?, ?, ?)
         ON CONFLICT(name) DO UPDATE SET
            keywords = excluded.keywords,
            category = excluded.category,
            priority = excluded.priority
         RETURNING id",
    )
    .bind(name)
    .bind(keywords_json)
    .bind(category)
    .bind(priority)
    .fetch_one(pool)
    .await?;

    Ok(id)
}
