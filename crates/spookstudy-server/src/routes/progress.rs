//! Progress endpoints: dashboards, event recording, preferences.

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use spookstudy_core::model::{Badge, Character, QuizResult, UserProgress};
use spookstudy_core::progress::{record_quiz_completed, record_story_read};
use spookstudy_core::stats::{halloween_metrics, learning_stats, HalloweenMetrics, LearningStats};

use crate::error::{ApiError, ApiJson};
use crate::routes::DEFAULT_USER;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_default))
        .route("/story-read", post(story_read))
        .route("/quiz-completed", post(quiz_completed))
        .route("/favorite-character", put(favorite_character))
        .route("/:user_id", get(get_progress))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressResponse {
    success: bool,
    progress: UserProgress,
    halloween_metrics: HalloweenMetrics,
    learning_stats: LearningStats,
}

fn progress_response(progress: UserProgress) -> ProgressResponse {
    ProgressResponse {
        success: true,
        halloween_metrics: halloween_metrics(&progress),
        learning_stats: learning_stats(&progress),
        progress,
    }
}

async fn get_default(State(state): State<AppState>) -> Result<Json<ProgressResponse>, ApiError> {
    let progress = state.progress.get_or_create(DEFAULT_USER).await?;
    Ok(Json(progress_response(progress)))
}

async fn get_progress(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let progress = state.progress.get_or_create(&user_id).await?;
    Ok(Json(progress_response(progress)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoryReadBody {
    story_id: String,
    topic: Option<String>,
    user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StoryReadResponse {
    success: bool,
    progress: UserProgress,
    new_badges: Vec<Badge>,
}

async fn story_read(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<StoryReadBody>,
) -> Result<Json<StoryReadResponse>, ApiError> {
    if body.story_id.trim().is_empty() {
        return Err(ApiError::validation(
            "missing storyId",
            "Include the id of the story that was read.",
        ));
    }
    let user_id = body.user_id.as_deref().unwrap_or(DEFAULT_USER);
    // Prefer the indexed topic; fall back to whatever the client sent.
    let topic = match state.stories.get(&body.story_id).await? {
        Some(story) => story.original_topic,
        None => body.topic.unwrap_or_else(|| "general".to_string()),
    };

    let mut progress = state.progress.get_or_create(user_id).await?;
    let new_badges = record_story_read(&mut progress, &body.story_id, &topic, Utc::now());
    state.progress.put(&progress).await?;

    info!(user_id, story_id = %body.story_id, badges = new_badges.len(), "story read recorded");
    Ok(Json(StoryReadResponse {
        success: true,
        progress,
        new_badges,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuizCompletedBody {
    quiz_id: String,
    score: u32,
    total_questions: usize,
    correct_answers: usize,
    time_spent: u64,
    user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuizCompletedResponse {
    success: bool,
    progress: UserProgress,
    earned_xp: u64,
    new_badges: Vec<Badge>,
    leveled_up: bool,
    level: u32,
}

async fn quiz_completed(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<QuizCompletedBody>,
) -> Result<Json<QuizCompletedResponse>, ApiError> {
    if body.quiz_id.trim().is_empty() {
        return Err(ApiError::validation(
            "missing quizId",
            "Include the id of the completed quiz.",
        ));
    }
    if body.score > 100 {
        return Err(ApiError::validation(
            "score out of range",
            "Scores run from 0 to 100.",
        ));
    }
    let user_id = body.user_id.as_deref().unwrap_or(DEFAULT_USER);

    let result = QuizResult {
        quiz_id: body.quiz_id,
        score: body.score,
        total_questions: body.total_questions,
        correct_answers: body.correct_answers,
        time_spent_secs: body.time_spent,
        feedback: String::new(),
        badges: Vec::new(),
        submitted_at: Utc::now(),
    };

    let mut progress = state.progress.get_or_create(user_id).await?;
    let outcome = record_quiz_completed(&mut progress, result);
    state.progress.put(&progress).await?;

    info!(
        user_id,
        earned_xp = outcome.earned_xp,
        level = outcome.level,
        "quiz completion recorded"
    );
    Ok(Json(QuizCompletedResponse {
        success: true,
        progress,
        earned_xp: outcome.earned_xp,
        new_badges: outcome.new_badges,
        leveled_up: outcome.leveled_up,
        level: outcome.level,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FavoriteCharacterBody {
    character: String,
    user_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct FavoriteCharacterResponse {
    success: bool,
    progress: UserProgress,
}

async fn favorite_character(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<FavoriteCharacterBody>,
) -> Result<Json<FavoriteCharacterResponse>, ApiError> {
    let character: Character = body.character.parse().map_err(|_| {
        ApiError::validation(
            format!("unknown character {:?}", body.character),
            "Pick one of our spooky friends: ghost, witch, vampire, or skeleton.",
        )
    })?;
    let user_id = body.user_id.as_deref().unwrap_or(DEFAULT_USER);

    let mut progress = state.progress.get_or_create(user_id).await?;
    progress.favorite_character = Some(character);
    state.progress.put(&progress).await?;

    Ok(Json(FavoriteCharacterResponse {
        success: true,
        progress,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use spookstudy_providers::SpookstudyConfig;

    async fn state(dir: &tempfile::TempDir) -> AppState {
        AppState::new(dir.path(), &SpookstudyConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn first_fetch_creates_record_with_welcome_badge() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir).await;
        let response = get_progress(State(state), Path("ghost-fan".into()))
            .await
            .unwrap();
        assert_eq!(response.0.progress.level, 1);
        assert!(response.0.progress.has_badge("welcome"));
        assert_eq!(response.0.halloween_metrics.pumpkins_collected, 0);
        assert_eq!(response.0.learning_stats.total_quizzes, 0);
    }

    #[tokio::test]
    async fn story_read_awards_xp_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir).await;
        let response = story_read(
            State(state.clone()),
            ApiJson(StoryReadBody {
                story_id: "story-1".into(),
                topic: Some("biology".into()),
                user_id: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.0.progress.experience_points, 10);
        assert!(response.0.new_badges.iter().any(|b| b.id == "first-story"));

        // Re-reading the same story is a no-op.
        let again = story_read(
            State(state.clone()),
            ApiJson(StoryReadBody {
                story_id: "story-1".into(),
                topic: Some("biology".into()),
                user_id: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(again.0.progress.experience_points, 10);
        assert!(again.0.new_badges.is_empty());

        let fetched = get_default(State(state)).await.unwrap();
        assert_eq!(fetched.0.halloween_metrics.pumpkins_collected, 1);
    }

    #[tokio::test]
    async fn quiz_completed_folds_into_progress() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir).await;
        let response = quiz_completed(
            State(state.clone()),
            ApiJson(QuizCompletedBody {
                quiz_id: "quiz-1".into(),
                score: 80,
                total_questions: 5,
                correct_answers: 4,
                time_spent: 120,
                user_id: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.0.earned_xp, 12);
        assert_eq!(response.0.level, 1);
        assert!(!response.0.leveled_up);
        assert!(response.0.progress.has_badge("first-quiz"));

        let fetched = get_default(State(state)).await.unwrap();
        assert_eq!(fetched.0.halloween_metrics.spells_cast, 1);
        assert_eq!(fetched.0.halloween_metrics.ghosts_befriended, 1);
    }

    #[tokio::test]
    async fn out_of_range_score_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir).await;
        let err = quiz_completed(
            State(state),
            ApiJson(QuizCompletedBody {
                quiz_id: "quiz-1".into(),
                score: 101,
                total_questions: 5,
                correct_answers: 5,
                time_spent: 60,
                user_id: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), 400);
    }

    #[tokio::test]
    async fn missing_fields_are_themed_400() {
        use axum::body::Body;
        use axum::extract::{FromRequest, Request};
        use axum::http::header::CONTENT_TYPE;

        let request = Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let err = ApiJson::<QuizCompletedBody>::from_request(request, &())
            .await
            .unwrap_err();
        assert_eq!(err.status(), 400);
    }

    #[tokio::test]
    async fn favorite_character_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir).await;
        let response = favorite_character(
            State(state.clone()),
            ApiJson(FavoriteCharacterBody {
                character: "witch".into(),
                user_id: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.0.progress.favorite_character, Some(Character::Witch));

        let err = favorite_character(
            State(state),
            ApiJson(FavoriteCharacterBody {
                character: "mummy".into(),
                user_id: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), 400);
    }
}
