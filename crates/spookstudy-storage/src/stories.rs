//! Story persistence: bodies, index, expiry, shareable links.
//!
//! Story bodies live in a [`JsonStore`] while a single index file carries
//! the metadata needed for listings and share-link lookup without reading
//! every body. Stories expire 30 days after creation; expired entries are
//! removed lazily on access and by [`StoryStore::cleanup_expired`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use spookstudy_core::error::StudyError;
use spookstudy_core::model::Story;

use crate::store::{validate_id, JsonStore};
use crate::Repository;

/// Days a story stays retrievable after creation.
pub const STORY_TTL_DAYS: i64 = 30;

/// Metadata kept per story in the index file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexEntry {
    id: String,
    title: String,
    topic: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    shareable_link: String,
}

/// Story repository with an index for listings and share links.
#[derive(Debug, Clone)]
pub struct StoryStore {
    bodies: JsonStore<Story>,
    index_path: PathBuf,
}

impl StoryStore {
    /// Open under `data_dir`, creating `data_dir/stories/` as needed. The
    /// index lives beside the body directory so it never shows up in body
    /// listings.
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, StudyError> {
        let data_dir = data_dir.as_ref();
        let bodies = JsonStore::open(data_dir.join("stories")).await?;
        Ok(Self {
            bodies,
            index_path: data_dir.join("story-index.json"),
        })
    }

    /// Persist a new story, stamping its shareable link. Returns the story
    /// as stored.
    pub async fn save(&self, mut story: Story) -> Result<Story, StudyError> {
        validate_id(&story.id)?;
        let token: String = Uuid::new_v4().simple().to_string()[..8].to_string();
        story.shareable_link = Some(format!("{}-{token}", story.id));

        self.bodies.put(&story.id, &story).await?;

        let mut index = self.read_index().await?;
        index.insert(
            story.id.clone(),
            IndexEntry {
                id: story.id.clone(),
                title: story.title.clone(),
                topic: story.original_topic.clone(),
                created_at: story.created_at,
                expires_at: story.created_at + Duration::days(STORY_TTL_DAYS),
                shareable_link: story.shareable_link.clone().unwrap_or_default(),
            },
        );
        self.write_index(&index).await?;
        debug!(story_id = %story.id, "story saved");
        Ok(story)
    }

    /// Fetch a story by id. Expired stories are deleted and reported absent.
    pub async fn get(&self, id: &str) -> Result<Option<Story>, StudyError> {
        let mut index = self.read_index().await?;
        match index.get(id) {
            None => Ok(None),
            Some(entry) if entry.expires_at <= Utc::now() => {
                self.bodies.delete(id).await?;
                index.remove(id);
                self.write_index(&index).await?;
                debug!(story_id = %id, "expired story removed on read");
                Ok(None)
            }
            Some(_) => self.bodies.get(id).await,
        }
    }

    /// Resolve a shareable link of the form `{id}-{token}` to its story.
    pub async fn get_by_share_link(&self, link: &str) -> Result<Option<Story>, StudyError> {
        let index = self.read_index().await?;
        let Some(entry) = index.values().find(|e| e.shareable_link == link) else {
            return Ok(None);
        };
        let id = entry.id.clone();
        self.get(&id).await
    }

    /// All unexpired stories, newest first.
    pub async fn list(&self) -> Result<Vec<Story>, StudyError> {
        let index = self.read_index().await?;
        let now = Utc::now();
        let mut live: Vec<&IndexEntry> =
            index.values().filter(|e| e.expires_at > now).collect();
        live.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut stories = Vec::with_capacity(live.len());
        for entry in live {
            if let Some(story) = self.bodies.get(&entry.id).await? {
                stories.push(story);
            }
        }
        Ok(stories)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, StudyError> {
        let mut index = self.read_index().await?;
        let known = index.remove(id).is_some();
        if known {
            self.write_index(&index).await?;
        }
        let removed = self.bodies.delete(id).await?;
        Ok(known || removed)
    }

    /// Sweep every expired story out of the store. Returns how many were
    /// removed.
    pub async fn cleanup_expired(&self) -> Result<usize, StudyError> {
        let mut index = self.read_index().await?;
        let now = Utc::now();
        let expired: Vec<String> = index
            .values()
            .filter(|e| e.expires_at <= now)
            .map(|e| e.id.clone())
            .collect();
        for id in &expired {
            self.bodies.delete(id).await?;
            index.remove(id);
        }
        if !expired.is_empty() {
            self.write_index(&index).await?;
            info!(removed = expired.len(), "expired stories cleaned up");
        }
        Ok(expired.len())
    }

    async fn read_index(&self) -> Result<HashMap<String, IndexEntry>, StudyError> {
        match tokio::fs::read(&self.index_path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_index(&self, index: &HashMap<String, IndexEntry>) -> Result<(), StudyError> {
        let json = serde_json::to_vec_pretty(index)?;
        tokio::fs::write(&self.index_path, json).await?;
        Ok(())
    }
}
