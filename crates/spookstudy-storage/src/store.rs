//! Generic one-file-per-record JSON store.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use spookstudy_core::error::StudyError;

use crate::Repository;

/// Directory of `{id}.json` files, pretty-printed for hand inspection.
#[derive(Debug, Clone)]
pub struct JsonStore<T> {
    dir: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StudyError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            _marker: PhantomData,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StudyError> {
        validate_id(id)?;
        Ok(self.dir.join(format!("{id}.json")))
    }
}

/// Ids become file names; anything that could escape the store directory is
/// rejected up front.
pub(crate) fn validate_id(id: &str) -> Result<(), StudyError> {
    if id.is_empty()
        || id.contains(['/', '\\', '\0'])
        || id == "."
        || id == ".."
    {
        return Err(StudyError::Validation(format!("invalid record id {id:?}")));
    }
    Ok(())
}

#[async_trait]
impl<T> Repository<T> for JsonStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    async fn get(&self, id: &str) -> Result<Option<T>, StudyError> {
        let path = self.path_for(id)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, id: &str, value: &T) -> Result<(), StudyError> {
        let path = self.path_for(id)?;
        let json = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(&path, json).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<T>, StudyError> {
        let mut records = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = tokio::fs::read(&path).await?;
            match serde_json::from_slice(&bytes) {
                Ok(record) => records.push(record),
                // One corrupt file must not take down the whole listing.
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable record"),
            }
        }
        Ok(records)
    }

    async fn delete(&self, id: &str) -> Result<bool, StudyError> {
        let path = self.path_for(id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Record {
        id: String,
        value: u32,
    }

    async fn store(dir: &tempfile::TempDir) -> JsonStore<Record> {
        JsonStore::open(dir.path().join("records")).await.unwrap()
    }

    #[tokio::test]
    async fn put_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        let record = Record {
            id: "r1".into(),
            value: 42,
        };
        store.put("r1", &record).await.unwrap();
        assert_eq!(store.get("r1").await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn get_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        assert_eq!(store.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_returns_all_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        for i in 0..3 {
            let record = Record {
                id: format!("r{i}"),
                value: i,
            };
            store.put(&record.id.clone(), &record).await.unwrap();
        }
        let mut listed = store.list().await.unwrap();
        listed.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[2].value, 2);
    }

    #[tokio::test]
    async fn list_skips_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        store
            .put(
                "good",
                &Record {
                    id: "good".into(),
                    value: 1,
                },
            )
            .await
            .unwrap();
        tokio::fs::write(store.dir().join("bad.json"), b"{not json")
            .await
            .unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_reports_presence() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        store
            .put(
                "r1",
                &Record {
                    id: "r1".into(),
                    value: 1,
                },
            )
            .await
            .unwrap();
        assert!(store.delete("r1").await.unwrap());
        assert!(!store.delete("r1").await.unwrap());
    }

    #[tokio::test]
    async fn path_traversal_ids_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        for id in ["", "..", "a/b", "a\\b"] {
            assert!(matches!(
                store.get(id).await.unwrap_err(),
                StudyError::Validation(_)
            ));
        }
    }
}
