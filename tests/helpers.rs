// Shared test helpers for database setup and test data creation.

use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use stream_status::create_tables;

/// Creates a test database pool with the schema applied.
///
/// Single connection: each pooled connection to `sqlite::memory:` would get
/// its own empty database otherwise.
#[allow(dead_code)] // Used by other test files
pub async fn create_test_pool() -> Arc<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool");
    create_tables(&pool)
        .await
        .expect("Failed to create tables");
    Arc::new(pool)
}

/// Inserts a channel row and returns its id.
#[allow(dead_code)]
pub async fn insert_test_channel(pool: &SqlitePool, name: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO channels (name, keywords) VALUES (?, ?) RETURNING id",
    )
    .bind(name)
    .bind(format!("[\"{name}\"]"))
    .fetch_one(pool)
    .await
    .expect("Failed to insert test channel")
}

/// Inserts an unchecked link row for a channel and returns its id.
#[allow(dead_code)]
pub async fn insert_test_link(pool: &SqlitePool, channel_id: i64, url: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO links (channel_id, url, first_found) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(channel_id)
    .bind(url)
    .bind(chrono::Utc::now().timestamp_millis())
    .fetch_one(pool)
    .await
    .expect("Failed to insert test link")
}
