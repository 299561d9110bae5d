//! Shared response parsing for the remote backends.
//!
//! Both providers ask for the same JSON shapes, so the conversion into core
//! types lives here. Shape violations become [`ProviderError`]s that the
//! fallback composition consumes.

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use spookstudy_core::extract::{estimated_read_minutes, key_learning_points};
use spookstudy_core::model::{Character, Quiz, QuizQuestion, Story, CHARACTER_PROFILES};
use spookstudy_core::quizgen::assemble_quiz;
use spookstudy_core::traits::{strip_json_fences, QuizRequest, StoryRequest};

use crate::error::ProviderError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AiQuestion {
    question: String,
    options: Vec<String>,
    correct_answer: usize,
    explanation: String,
}

#[derive(Debug, Deserialize)]
struct AiStory {
    title: String,
    content: String,
}

/// Parse a model response into a validated [`Quiz`].
pub(crate) fn quiz_from_response(
    response: &str,
    request: &QuizRequest,
) -> Result<Quiz, ProviderError> {
    let cleaned = strip_json_fences(response);
    let raw: Vec<AiQuestion> = serde_json::from_str(&cleaned)
        .map_err(|e| ProviderError::MalformedResponse(format!("not a question array: {e}")))?;

    let questions: Vec<QuizQuestion> = raw
        .into_iter()
        .map(|q| QuizQuestion {
            id: String::new(), // assigned in assemble_quiz
            prompt: q.question,
            options: q.options,
            correct_answer: q.correct_answer,
            explanation: q.explanation,
            character: Character::Ghost, // reassigned in assemble_quiz
        })
        .collect();

    let quiz = assemble_quiz(&request.story_id, request.difficulty, questions);
    quiz.validate()
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
    Ok(quiz)
}

/// Parse a model response into a [`Story`], deriving the metadata the model
/// is not asked for.
pub(crate) fn story_from_response(
    response: &str,
    request: &StoryRequest,
) -> Result<Story, ProviderError> {
    let cleaned = strip_json_fences(response);
    let raw: AiStory = serde_json::from_str(&cleaned)
        .map_err(|e| ProviderError::MalformedResponse(format!("not a story object: {e}")))?;
    if raw.title.trim().is_empty() || raw.content.trim().is_empty() {
        return Err(ProviderError::MalformedResponse(
            "story title or content empty".into(),
        ));
    }

    Ok(Story {
        id: format!("story-{}", Uuid::new_v4()),
        title: raw.title,
        estimated_read_minutes: estimated_read_minutes(&raw.content),
        content: raw.content,
        original_content: Some(request.content.clone()),
        original_topic: request.topic(),
        characters: CHARACTER_PROFILES
            .iter()
            .take(2)
            .map(|c| c.name.to_string())
            .collect(),
        key_learning_points: key_learning_points(&request.content),
        created_at: Utc::now(),
        shareable_link: None,
    })
}
