use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub positions: u32,
    pub department: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Job {
    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some("Active")
    }
}

/// Body of `POST /jobs/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewJob {
    pub title: String,
    pub department: String,
    pub positions: u32,
    pub description: String,
}
