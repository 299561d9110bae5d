//! Shared application state.
//!
//! Every store and generation source is constructed once here and handed to
//! the router explicitly. No module-level singletons.

use std::path::Path;
use std::sync::Arc;

use spookstudy_core::error::StudyError;
use spookstudy_core::traits::{QuizSource, StorySource};
use spookstudy_providers::{build_sources, SpookstudyConfig};
use spookstudy_storage::{ProgressStore, QuizStore, ResultStore, StoryStore};

#[derive(Clone)]
pub struct AppState {
    pub stories: StoryStore,
    pub quizzes: QuizStore,
    pub results: ResultStore,
    pub progress: ProgressStore,
    pub quiz_source: Arc<dyn QuizSource>,
    pub story_source: Arc<dyn StorySource>,
}

impl AppState {
    /// Open all stores under `data_dir` and wire the generation sources
    /// from the provider configuration.
    pub async fn new(
        data_dir: impl AsRef<Path>,
        config: &SpookstudyConfig,
    ) -> Result<Self, StudyError> {
        let data_dir = data_dir.as_ref();
        let (quiz_source, story_source) = build_sources(config);
        Ok(Self {
            stories: StoryStore::open(data_dir).await?,
            quizzes: QuizStore::open(data_dir).await?,
            results: ResultStore::open(data_dir).await?,
            progress: ProgressStore::open(data_dir).await?,
            quiz_source: Arc::new(quiz_source),
            story_source: Arc::new(story_source),
        })
    }
}
