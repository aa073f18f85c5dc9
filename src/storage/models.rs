// storage/models.rs
// Database models and types

use crate::state::LinkStatus;

/// One row of the `links` table: a candidate stream URL and the summarized
/// outcome of its check history.
///
/// # Database Schema
///
/// Timestamps are stored as milliseconds since Unix epoch. `status` is stored
/// as its lowercase text form and only ever changes through
/// [`crate::state::apply_verdict`]; `quality_score` is a 0-100 column written
/// only on successful verdicts.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LinkRecord {
    pub id: i64,
    pub channel_id: i64,
    pub url: String,
    pub source: Option<String>,
    pub status: String,
    pub response_time: Option<f64>,
    pub http_status: Option<i64>,
    pub content_type: Option<String>,
    pub resolution: Option<String>,
    pub codec: Option<String>,
    pub bitrate: Option<i64>,
    pub fps: Option<f64>,
    pub quality_score: i64,
    pub check_count: i64,
    pub success_count: i64,
    pub fail_count: i64,
    pub is_valid: bool,
    pub first_found: i64,
    pub last_checked: Option<i64>,
    pub last_success: Option<i64>,
    pub error_message: Option<String>,
}

impl LinkRecord {
    /// Typed view of the stored status text; unrecognized text reads as
    /// `Unknown` rather than failing the whole row.
    pub fn status(&self) -> LinkStatus {
        self.status.parse().unwrap_or(LinkStatus::Unknown)
    }
}

/// A registered channel with its search keywords.
#[derive(Debug, Clone)]
pub struct Channel {
    pub id: i64,
    pub name: String,
    pub keywords: Vec<String>,
    pub category: Option<String>,
    pub priority: i64,
    pub is_active: bool,
}
