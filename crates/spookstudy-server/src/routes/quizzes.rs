//! Quiz endpoints: generation, retrieval, submission, retry, result stats.

use std::collections::HashMap;

use axum::extract::{Path, Request, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use spookstudy_core::error::StudyError;
use spookstudy_core::model::{Difficulty, Quiz, QuizResult, Story};
use spookstudy_core::scoring::{celebration_message, retry_suggestions, score_quiz};
use spookstudy_core::traits::QuizRequest;
use spookstudy_storage::UserQuizStats;

use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

/// Suggestions are offered below this score.
const SUGGESTION_SCORE: u32 = 90;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate))
        .route("/submit", post(submit))
        .route("/retry/:story_id", post(retry))
        .route("/:id", get(get_quiz))
        .route("/results/:quiz_id", get(results_for))
        .route("/stats/user", get(user_stats))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody {
    story_id: String,
    difficulty: Option<String>,
    question_count: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    success: bool,
    quiz: Quiz,
    /// Suggested completion time in whole minutes.
    estimated_time: u64,
}

fn parse_difficulty(raw: Option<&str>) -> Result<Difficulty, ApiError> {
    match raw {
        None => Ok(Difficulty::Medium),
        Some(s) => s.parse().map_err(|_| {
            ApiError::validation(
                format!("invalid difficulty {s:?}"),
                "Choose easy, medium, or hard.",
            )
        }),
    }
}

fn check_question_count(count: Option<usize>) -> Result<Option<usize>, ApiError> {
    match count {
        Some(0) => Err(ApiError::validation(
            "questionCount must be at least 1",
            "Ask for at least one question, or omit questionCount for the default.",
        )),
        other => Ok(other),
    }
}

async fn load_story(state: &AppState, story_id: &str) -> Result<Story, ApiError> {
    state
        .stories
        .get(story_id)
        .await?
        .ok_or_else(|| {
            ApiError::with_suggestion(
                StudyError::not_found("story", story_id.to_string()),
                "Generate a story first, then ask for a quiz about it.",
            )
        })
}

async fn build_quiz_for(
    state: &AppState,
    story: &Story,
    difficulty: Difficulty,
    question_count: Option<usize>,
) -> Result<Quiz, ApiError> {
    // Quiz against the raw study text when available so questions target
    // the educational content, not the spooky framing.
    let content = story
        .original_content
        .clone()
        .unwrap_or_else(|| story.content.clone());
    let quiz = state
        .quiz_source
        .generate(&QuizRequest {
            story_id: story.id.clone(),
            content,
            difficulty,
            question_count,
        })
        .await?;
    state.quizzes.save(&quiz).await?;
    info!(quiz_id = %quiz.id, story_id = %story.id, backend = state.quiz_source.name(), "quiz generated");
    Ok(quiz)
}

async fn generate(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GenerateBody>,
) -> Result<Json<GenerateResponse>, ApiError> {
    if body.story_id.trim().is_empty() {
        return Err(ApiError::validation(
            "missing storyId",
            "Include the id of the story to quiz on.",
        ));
    }
    let difficulty = parse_difficulty(body.difficulty.as_deref())?;
    let question_count = check_question_count(body.question_count)?;
    let story = load_story(&state, &body.story_id).await?;
    let quiz = build_quiz_for(&state, &story, difficulty, question_count).await?;
    let estimated_time = quiz.time_limit_secs.div_ceil(60);
    Ok(Json(GenerateResponse {
        success: true,
        quiz,
        estimated_time,
    }))
}

#[derive(Debug, Serialize)]
struct QuizResponse {
    success: bool,
    quiz: Quiz,
}

async fn get_quiz(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<QuizResponse>, ApiError> {
    let quiz = state.quizzes.get(&id).await?.ok_or_else(|| {
        ApiError::with_suggestion(
            StudyError::not_found("quiz", id.clone()),
            "This quiz has crumbled to dust. Generate a new one!",
        )
    })?;
    Ok(Json(QuizResponse {
        success: true,
        quiz,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitBody {
    quiz_id: String,
    answers: HashMap<String, i32>,
    time_spent: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    success: bool,
    results: QuizResult,
    celebration_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_suggestions: Option<Vec<String>>,
}

async fn submit(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SubmitBody>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let quiz = state.quizzes.get(&body.quiz_id).await?.ok_or_else(|| {
        ApiError::with_suggestion(
            StudyError::not_found("quiz", body.quiz_id.clone()),
            "This quiz has crumbled to dust. Generate a new one!",
        )
    })?;

    let result = score_quiz(&quiz, &body.answers, body.time_spent, Utc::now());
    state.results.save(&result).await?;

    let celebration = celebration_message(result.score, &result.badges);
    let suggestions = if result.score < SUGGESTION_SCORE {
        Some(retry_suggestions(result.score, quiz.difficulty))
    } else {
        None
    };

    info!(quiz_id = %quiz.id, score = result.score, "quiz submitted");
    Ok(Json(SubmitResponse {
        success: true,
        results: result,
        celebration_message: celebration,
        retry_suggestions: suggestions,
    }))
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RetryBody {
    difficulty: Option<String>,
    question_count: Option<usize>,
}

async fn retry(
    State(state): State<AppState>,
    Path(story_id): Path<String>,
    request: Request,
) -> Result<Json<GenerateResponse>, ApiError> {
    // The body is optional; an empty one means "same settings, new quiz".
    // A present-but-malformed body is still a themed 400.
    let bytes = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .map_err(|e| {
            ApiError::validation(
                format!("unreadable request body: {e}"),
                "Send a JSON body, or none at all.",
            )
        })?;
    let body: RetryBody = if bytes.is_empty() {
        RetryBody::default()
    } else {
        serde_json::from_slice(&bytes).map_err(|e| {
            ApiError::validation(
                format!("malformed request body: {e}"),
                "Send JSON like {\"difficulty\": \"hard\"}, or no body at all.",
            )
        })?
    };
    let difficulty = parse_difficulty(body.difficulty.as_deref())?;
    let question_count = check_question_count(body.question_count)?;
    let story = load_story(&state, &story_id).await?;
    let quiz = build_quiz_for(&state, &story, difficulty, question_count).await?;
    let estimated_time = quiz.time_limit_secs.div_ceil(60);
    Ok(Json(GenerateResponse {
        success: true,
        quiz,
        estimated_time,
    }))
}

#[derive(Debug, Serialize)]
struct ResultsResponse {
    success: bool,
    results: Vec<QuizResult>,
    count: usize,
}

async fn results_for(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> Result<Json<ResultsResponse>, ApiError> {
    let results = state.results.results_for(&quiz_id).await?;
    let count = results.len();
    Ok(Json(ResultsResponse {
        success: true,
        results,
        count,
    }))
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    success: bool,
    stats: UserQuizStats,
}

async fn user_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.results.user_stats().await?;
    Ok(Json(StatsResponse {
        success: true,
        stats,
    }))
}
