//! Generator trait definitions for story and quiz backends.
//!
//! These async traits are implemented by the template builders in this crate
//! and by the remote AI providers in `spookstudy-providers`. Callers never
//! need to know which backend served a request; the fallback composition in
//! the providers crate enforces the quiz shape invariants at the boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StudyError;
use crate::model::{Difficulty, Quiz, Story};

// ---------------------------------------------------------------------------
// Quiz generation
// ---------------------------------------------------------------------------

/// Trait for backends that turn story content into a quiz.
#[async_trait]
pub trait QuizSource: Send + Sync {
    /// Human-readable backend name (e.g. "openai", "template").
    fn name(&self) -> &str;

    /// Generate a quiz from story content.
    async fn generate(&self, request: &QuizRequest) -> Result<Quiz, StudyError>;
}

/// Request to generate a quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizRequest {
    /// Story the quiz belongs to.
    pub story_id: String,
    /// The story content to draw questions from.
    pub content: String,
    pub difficulty: Difficulty,
    /// Overrides the difficulty's default question count when set.
    #[serde(default)]
    pub question_count: Option<usize>,
}

impl QuizRequest {
    /// The number of questions this request targets.
    pub fn target_count(&self) -> usize {
        self.question_count
            .unwrap_or_else(|| self.difficulty.question_count())
    }
}

// ---------------------------------------------------------------------------
// Story generation
// ---------------------------------------------------------------------------

/// Trait for backends that wrap study text in a themed narrative.
#[async_trait]
pub trait StorySource: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, request: &StoryRequest) -> Result<Story, StudyError>;
}

/// Request to generate a story.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryRequest {
    /// The raw study text.
    pub content: String,
    /// Original file name, if the text came from an upload.
    #[serde(default)]
    pub file_name: Option<String>,
}

impl StoryRequest {
    /// Topic label recorded on the story.
    pub fn topic(&self) -> String {
        self.file_name
            .clone()
            .unwrap_or_else(|| "Direct text input".to_string())
    }
}

// ---------------------------------------------------------------------------
// Model response cleanup
// ---------------------------------------------------------------------------

/// Strip markdown code fences from a model response so the remainder can be
/// parsed as JSON.
///
/// Handles ```json fences, bare ``` fences, and raw JSON with no fences.
pub fn strip_json_fences(response: &str) -> String {
    let mut out = String::with_capacity(response.len());
    for line in response.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(line);
    }
    out.trim().to_string()
}
