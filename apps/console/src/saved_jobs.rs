use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::errors::ClientResult;

/// Job ids bookmarked by the candidate, kept in a local JSON array file.
#[derive(Debug, Clone)]
pub struct SavedJobs {
    path: PathBuf,
    ids: Vec<i64>,
}

impl SavedJobs {
    /// Reads the list from `path`. A missing or unreadable file gives an empty list.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let ids = match tokio::fs::read(&path).await {
            Ok(raw) => serde_json::from_slice(&raw).unwrap_or_else(|e| {
                warn!("Ignoring corrupt saved jobs file {}: {e}", path.display());
                Vec::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!("Error reading saved jobs file {}: {e}", path.display());
                Vec::new()
            }
        };
        Self { path, ids }
    }

    pub fn contains(&self, job_id: i64) -> bool {
        self.ids.contains(&job_id)
    }

    /// Adds or removes `job_id` and writes the list back. Returns whether the
    /// job is saved afterwards. The in-memory list only changes once the file
    /// has been written.
    pub async fn toggle(&mut self, job_id: i64) -> ClientResult<bool> {
        let saved = !self.contains(job_id);
        let ids: Vec<i64> = if saved {
            self.ids.iter().copied().chain([job_id]).collect()
        } else {
            self.ids.iter().copied().filter(|id| *id != job_id).collect()
        };
        let raw = serde_json::to_vec(&ids)?;
        tokio::fs::write(&self.path, raw).await?;
        debug!("Saved jobs now {ids:?}");
        self.ids = ids;
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let saved = SavedJobs::load(dir.path().join("saved_jobs.json")).await;
        assert!(saved.ids.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved_jobs.json");
        std::fs::write(&path, "{not json").unwrap();

        let saved = SavedJobs::load(&path).await;
        assert!(saved.ids.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_persists_across_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved_jobs.json");

        let mut saved = SavedJobs::load(&path).await;
        assert!(saved.toggle(3).await.unwrap());
        assert!(saved.toggle(1).await.unwrap());
        assert!(!saved.toggle(3).await.unwrap());

        let reloaded = SavedJobs::load(&path).await;
        assert_eq!(reloaded.ids, vec![1]);
        assert!(reloaded.contains(1));
        assert!(!reloaded.contains(3));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[1]");
    }

    #[tokio::test]
    async fn test_failed_write_leaves_list_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("saved_jobs.json");

        let mut saved = SavedJobs::load(&path).await;
        assert!(saved.toggle(7).await.is_err());
        assert!(!saved.contains(7));
        assert!(saved.ids.is_empty());
    }
}
