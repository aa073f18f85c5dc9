//! Storage and end-to-end run tests against a real database file.

mod helpers;

use stream_status::channels::{get_channel_by_name, list_active_channels, upsert_channel};
use stream_status::storage::{
    create_tables, init_db_pool, insert_candidate, query_links_for_check,
};
use stream_status::{run_check, Config};

use helpers::{create_test_pool, insert_test_channel, insert_test_link};

#[tokio::test]
async fn file_backed_pool_creates_schema() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("stream_status.db");

    let pool = init_db_pool(&db_path).await.expect("Failed to init pool");
    create_tables(&pool).await.expect("Failed to create tables");
    assert!(db_path.exists());

    // Idempotent: opening the same file again must not fail.
    let pool2 = init_db_pool(&db_path).await.expect("Failed to reopen pool");
    create_tables(&pool2).await.expect("Failed to re-create tables");
}

#[tokio::test]
async fn upsert_channel_updates_in_place() {
    let pool = create_test_pool().await;

    let keywords = vec!["CCTV1".to_string(), "中央电视台".to_string()];
    let id = upsert_channel(&pool, "CCTV1", &keywords, Some("央视"), 10)
        .await
        .expect("Failed to upsert channel");

    let updated = vec!["CCTV1".to_string()];
    let id2 = upsert_channel(&pool, "CCTV1", &updated, Some("央视"), 20)
        .await
        .expect("Failed to upsert channel");
    assert_eq!(id, id2);

    let channel = get_channel_by_name(&pool, "CCTV1")
        .await
        .expect("Query failed")
        .expect("Channel missing");
    assert_eq!(channel.keywords, updated);
    assert_eq!(channel.priority, 20);
}

#[tokio::test]
async fn active_channels_come_back_highest_priority_first() {
    let pool = create_test_pool().await;
    upsert_channel(&pool, "CCTV1", &[], Some("央视"), 10)
        .await
        .unwrap();
    upsert_channel(&pool, "CCTV5", &[], Some("央视"), 30)
        .await
        .unwrap();
    upsert_channel(&pool, "湖南卫视", &[], Some("卫视"), 20)
        .await
        .unwrap();

    let all = list_active_channels(&pool, None).await.unwrap();
    let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["CCTV5", "湖南卫视", "CCTV1"]);

    let cctv_only = list_active_channels(&pool, Some("央视")).await.unwrap();
    assert_eq!(cctv_only.len(), 2);
}

#[tokio::test]
async fn duplicate_candidate_is_ignored() {
    let pool = create_test_pool().await;
    let channel_id = insert_test_channel(&pool, "CCTV1").await;

    let candidate = stream_status::candidate::CandidateLink {
        url: "http://cdn.example.com/live/cctv1.m3u8".to_string(),
        declared_name: "CCTV1 高清".to_string(),
        source: "example".to_string(),
    };

    let first = insert_candidate(&pool, channel_id, &candidate).await.unwrap();
    assert!(first);
    let second = insert_candidate(&pool, channel_id, &candidate).await.unwrap();
    assert!(!second);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(&*pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn check_queue_skips_settled_links() {
    let pool = create_test_pool().await;
    let channel_id = insert_test_channel(&pool, "CCTV1").await;

    let fresh = insert_test_link(&pool, channel_id, "http://a.example.com/1.m3u8").await;
    let active = insert_test_link(&pool, channel_id, "http://a.example.com/2.m3u8").await;
    let errored = insert_test_link(&pool, channel_id, "http://a.example.com/3.m3u8").await;

    sqlx::query("UPDATE links SET status = 'active', last_checked = 100 WHERE id = ?")
        .bind(active)
        .execute(&*pool)
        .await
        .unwrap();
    sqlx::query("UPDATE links SET status = 'error', last_checked = 200 WHERE id = ?")
        .bind(errored)
        .execute(&*pool)
        .await
        .unwrap();

    let eligible = query_links_for_check(&pool, None, 0).await.unwrap();
    let ids: Vec<i64> = eligible.iter().map(|l| l.id).collect();
    // Never-checked links come first, then active ones; errored links are
    // not re-queued.
    assert_eq!(ids, [fresh, active]);

    let limited = query_links_for_check(&pool, None, 1).await.unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].id, fresh);
}

#[tokio::test]
async fn run_check_on_empty_database_reports_zero() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = Config {
        db_path: dir.path().join("empty.db"),
        ..Default::default()
    };

    let report = run_check(config).await.expect("run_check failed");
    assert_eq!(report.total, 0);
    assert_eq!(report.success, 0);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn run_check_rejects_unknown_channel_name() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = Config {
        db_path: dir.path().join("scoped.db"),
        channel: Some("No Such Channel".to_string()),
        ..Default::default()
    };

    let err = run_check(config).await.expect_err("expected an error");
    assert!(format!("{err:#}").contains("No Such Channel"));
}
