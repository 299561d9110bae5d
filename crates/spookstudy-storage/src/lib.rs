//! Flat-file JSON persistence for spookstudy.
//!
//! One pretty-printed JSON file per record, grouped per kind under a data
//! directory. Deliberately lock-free: the deployment target is a single
//! casual user, so read-modify-write with last-writer-wins is accepted.
//! Everything goes through the narrow [`Repository`] trait so the backing
//! store can be swapped without touching business logic.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use spookstudy_core::error::StudyError;

pub mod progress;
pub mod quizzes;
pub mod stories;
pub mod store;

pub use progress::ProgressStore;
pub use quizzes::{QuizStore, ResultStore, UserQuizStats};
pub use stories::{StoryStore, STORY_TTL_DAYS};
pub use store::JsonStore;

/// Minimal id-keyed persistence interface.
#[async_trait]
pub trait Repository<T>: Send + Sync
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    async fn get(&self, id: &str) -> Result<Option<T>, StudyError>;
    async fn put(&self, id: &str, value: &T) -> Result<(), StudyError>;
    async fn list(&self) -> Result<Vec<T>, StudyError>;
    async fn delete(&self, id: &str) -> Result<bool, StudyError>;
}
