//! User progress persistence: one JSON file holding every user's record.
//!
//! Read-modify-write per request with no locking. The deployment target is
//! one casual user, so last-writer-wins is an accepted trade-off rather
//! than an oversight.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use spookstudy_core::error::StudyError;
use spookstudy_core::model::UserProgress;

/// Map of user id to progress record, stored as a single file.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, StudyError> {
        let data_dir = data_dir.as_ref();
        tokio::fs::create_dir_all(data_dir).await?;
        Ok(Self {
            path: data_dir.join("progress.json"),
        })
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<UserProgress>, StudyError> {
        Ok(self.read_all().await?.remove(user_id))
    }

    /// Fetch the user's record, creating a fresh one on first access.
    pub async fn get_or_create(&self, user_id: &str) -> Result<UserProgress, StudyError> {
        let mut all = self.read_all().await?;
        if let Some(progress) = all.remove(user_id) {
            return Ok(progress);
        }
        debug!(user_id, "creating fresh progress record");
        let progress = UserProgress::new(user_id);
        all.insert(user_id.to_string(), progress.clone());
        self.write_all(&all).await?;
        Ok(progress)
    }

    pub async fn put(&self, progress: &UserProgress) -> Result<(), StudyError> {
        let mut all = self.read_all().await?;
        all.insert(progress.user_id.clone(), progress.clone());
        self.write_all(&all).await
    }

    async fn read_all(&self) -> Result<HashMap<String, UserProgress>, StudyError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, all: &HashMap<String, UserProgress>) -> Result<(), StudyError> {
        let json = serde_json::to_vec_pretty(all)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}
