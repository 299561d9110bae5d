//! Mock generation sources for testing.
//!
//! Let the fallback composition and the server handlers be exercised
//! without real API calls: fixed successful output, or a configured
//! failure, with call counting for assertions.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use spookstudy_core::error::StudyError;
use spookstudy_core::model::{Quiz, Story};
use spookstudy_core::traits::{QuizRequest, QuizSource, StoryRequest, StorySource};

/// A quiz backend that returns a fixed quiz or a fixed failure.
pub struct MockQuizSource {
    quiz: Option<Quiz>,
    failure: Option<String>,
    call_count: AtomicU32,
    last_request: Mutex<Option<QuizRequest>>,
}

impl MockQuizSource {
    /// Always succeed with a clone of `quiz`.
    pub fn with_quiz(quiz: Quiz) -> Self {
        Self {
            quiz: Some(quiz),
            failure: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Always fail with an upstream error carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            quiz: None,
            failure: Some(message.to_string()),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_request(&self) -> Option<QuizRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuizSource for MockQuizSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &QuizRequest) -> Result<Quiz, StudyError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());
        match (&self.quiz, &self.failure) {
            (Some(quiz), _) => Ok(quiz.clone()),
            (None, Some(message)) => Err(StudyError::Upstream(message.clone())),
            (None, None) => Err(StudyError::Upstream("mock not configured".into())),
        }
    }
}

/// A story backend that returns a fixed story or a fixed failure.
pub struct MockStorySource {
    story: Option<Story>,
    failure: Option<String>,
    call_count: AtomicU32,
}

impl MockStorySource {
    pub fn with_story(story: Story) -> Self {
        Self {
            story: Some(story),
            failure: None,
            call_count: AtomicU32::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            story: None,
            failure: Some(message.to_string()),
            call_count: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl StorySource for MockStorySource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, _request: &StoryRequest) -> Result<Story, StudyError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        match (&self.story, &self.failure) {
            (Some(story), _) => Ok(story.clone()),
            (None, Some(message)) => Err(StudyError::Upstream(message.clone())),
            (None, None) => Err(StudyError::Upstream("mock not configured".into())),
        }
    }
}
