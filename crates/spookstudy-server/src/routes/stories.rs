//! Story endpoints: generation, listing, retrieval by id or share link.

use std::time::Instant;

use axum::extract::{FromRequest, Multipart, Path, Query, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use spookstudy_core::error::StudyError;
use spookstudy_core::model::Story;
use spookstudy_core::traits::StoryRequest;

use crate::error::ApiError;
use crate::state::AppState;

/// Minimum study-text length the spirits will work with.
const MIN_CONTENT_LEN: usize = 10;
/// Maximum study-text length for one story.
const MAX_CONTENT_LEN: usize = 10_000;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate))
        .route("/", get(list))
        .route("/:id", get(get_story))
}

#[derive(Deserialize)]
struct GenerateBody {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    success: bool,
    story: Story,
    processing_time: f64,
    message: String,
}

/// Study text plus the file name it came from, if any.
struct Intake {
    content: String,
    file_name: Option<String>,
}

/// Accept either a JSON body (`{content}`) or a multipart form with a
/// `file` or `content` field.
async fn read_intake(request: Request) -> Result<Intake, ApiError> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false);

    if is_multipart {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| ApiError::validation(
                format!("unreadable upload: {e}"),
                "The spirits had trouble reading your file. Please try a different format!",
            ))?;
        let mut content = None;
        let mut file_name = None;
        while let Some(field) = multipart.next_field().await.map_err(|e| {
            ApiError::validation(
                format!("unreadable upload: {e}"),
                "The spirits had trouble reading your file. Please try a different format!",
            )
        })? {
            match field.name() {
                Some("file") => {
                    file_name = field.file_name().map(str::to_string);
                    content = Some(field.text().await.map_err(|e| {
                        ApiError::validation(
                            format!("unreadable file: {e}"),
                            "The spirits had trouble reading your file. Please try a \
                             different format!",
                        )
                    })?);
                }
                Some("content") => {
                    content = Some(field.text().await.map_err(|e| {
                        ApiError::validation(
                            format!("unreadable field: {e}"),
                            "Please paste plain text content.",
                        )
                    })?);
                }
                _ => {}
            }
        }
        return match content {
            Some(content) => Ok(Intake { content, file_name }),
            None => Err(no_content_error()),
        };
    }

    let Json(body): Json<GenerateBody> =
        Json::from_request(request, &()).await.map_err(|e| {
            ApiError::validation(format!("malformed request body: {e}"), "Send JSON like {\"content\": \"your study text\"}.")
        })?;
    match body.content {
        Some(content) => Ok(Intake {
            content,
            file_name: None,
        }),
        None => Err(no_content_error()),
    }
}

fn no_content_error() -> ApiError {
    ApiError::validation(
        "no content provided",
        "Please upload a file or paste some text to transform into a spooky story!",
    )
}

async fn generate(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<GenerateResponse>, ApiError> {
    let intake = read_intake(request).await?;

    let trimmed = intake.content.trim();
    if trimmed.len() < MIN_CONTENT_LEN {
        return Err(ApiError::validation(
            "content too short",
            "Please provide more content for the spirits to work with! (At least 10 characters)",
        ));
    }
    if intake.content.len() > MAX_CONTENT_LEN {
        return Err(ApiError::validation(
            "content too long",
            "That's too much content for one spooky story! Please keep it under 10,000 characters.",
        ));
    }

    let start = Instant::now();
    let story = state
        .story_source
        .generate(&StoryRequest {
            content: intake.content,
            file_name: intake.file_name,
        })
        .await?;
    let story = state.stories.save(story).await?;
    let processing_time = start.elapsed().as_secs_f64();

    info!(story_id = %story.id, backend = state.story_source.name(), "story generated");
    Ok(Json(GenerateResponse {
        success: true,
        story,
        processing_time,
        message: "👻 Your spooky story has been conjured by the spirits!".to_string(),
    }))
}

#[derive(Deserialize)]
struct ListParams {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ListResponse {
    success: bool,
    stories: Vec<Story>,
    count: usize,
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let mut stories = state.stories.list().await?;
    if let Some(limit) = params.limit {
        stories.truncate(limit);
    }
    let count = stories.len();
    Ok(Json(ListResponse {
        success: true,
        stories,
        count,
    }))
}

#[derive(Debug, Serialize)]
struct GetResponse {
    success: bool,
    data: Story,
}

/// Fetch by story id, falling back to shareable-link lookup.
async fn get_story(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GetResponse>, ApiError> {
    let mut story = None;
    if id.starts_with("story-") {
        story = state.stories.get(&id).await?;
    }
    if story.is_none() {
        story = state.stories.get_by_share_link(&id).await?;
    }
    let story = story.ok_or_else(|| {
        ApiError::with_suggestion(
            StudyError::not_found("story", id.clone()),
            "This story seems to have vanished into the spirit realm! It may have expired \
             or never existed.",
        )
    })?;
    Ok(Json(GetResponse {
        success: true,
        data: story,
    }))
}
