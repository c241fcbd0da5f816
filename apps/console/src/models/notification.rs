use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub job: Option<i64>,
    #[serde(default)]
    pub job_title: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Body of `GET /notifications/unread_count/`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UnreadCount {
    #[serde(default)]
    pub count: u32,
}
