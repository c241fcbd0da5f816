use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Console configuration loaded from environment variables.
/// Every variable has a default; malformed numbers fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout: Duration,
    /// Refresh period of the candidate dashboard.
    pub poll_interval: Duration,
    pub saved_jobs_path: PathBuf,
    /// Department that the manager's team analytics are scoped to.
    pub manager_department: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_base_url: optional_env("API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            request_timeout: Duration::from_secs(seconds_env("REQUEST_TIMEOUT_SECS", 30)?),
            poll_interval: Duration::from_secs(seconds_env("POLL_INTERVAL_SECS", 30)?),
            saved_jobs_path: optional_env("SAVED_JOBS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("saved_jobs.json")),
            manager_department: optional_env("MANAGER_DEPARTMENT")
                .unwrap_or_else(|| "Engineering".to_string()),
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn seconds_env(key: &str, default: u64) -> Result<u64> {
    match optional_env(key) {
        Some(raw) => parse_seconds(key, &raw),
        None => Ok(default),
    }
}

fn parse_seconds(key: &str, raw: &str) -> Result<u64> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("{key} must be a whole number of seconds, got '{raw}'"))?;
    if secs == 0 {
        anyhow::bail!("{key} must be greater than zero");
    }
    Ok(secs)
}
