//! Themed error translation layer.
//!
//! Every handler error funnels through [`ApiError`], which renders the
//! uniform payload: `{error: true, message, character, suggestedAction?,
//! errorCode, timestamp}`. The character is decorative and random; the
//! status comes from the underlying [`StudyError`] kind.

use async_trait::async_trait;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;

use spookstudy_core::error::StudyError;

struct SpookyCharacter {
    name: &'static str,
    personality: &'static str,
    catchphrase: &'static str,
}

const SPOOKY_CHARACTERS: [SpookyCharacter; 4] = [
    SpookyCharacter {
        name: "Friendly Ghost",
        personality: "helpful and encouraging",
        catchphrase: "Boo-hoo! Don't worry, we can fix this!",
    },
    SpookyCharacter {
        name: "Wise Witch",
        personality: "knowledgeable and patient",
        catchphrase: "Hocus pocus! Let me help you focus!",
    },
    SpookyCharacter {
        name: "Cheerful Vampire",
        personality: "optimistic and supportive",
        catchphrase: "Blah! No need to be batty about this error!",
    },
    SpookyCharacter {
        name: "Helpful Skeleton",
        personality: "straightforward and clear",
        catchphrase: "Bone-afide advice coming your way!",
    },
];

/// Handler error carrying an optional user-facing suggestion.
#[derive(Debug)]
pub struct ApiError {
    source: StudyError,
    suggested_action: Option<String>,
}

impl ApiError {
    pub fn with_suggestion(source: StudyError, suggestion: impl Into<String>) -> Self {
        Self {
            source,
            suggested_action: Some(suggestion.into()),
        }
    }

    pub fn validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::with_suggestion(StudyError::Validation(message.into()), suggestion)
    }

    pub fn status(&self) -> u16 {
        self.source.status_code()
    }

    fn default_suggestion(&self) -> Option<String> {
        match self.status() {
            404 => Some("Check the URL or navigate back to the main page.".to_string()),
            s if s >= 500 => Some(
                "Please try again in a moment. If the problem continues, our ghost \
                 developers are on it!"
                    .to_string(),
            ),
            _ => None,
        }
    }
}

impl From<StudyError> for ApiError {
    fn from(source: StudyError) -> Self {
        Self {
            source,
            suggested_action: None,
        }
    }
}

/// JSON extractor whose rejection renders the themed payload instead of
/// axum's plain-text default, keeping the error shape uniform.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            ApiError::validation(
                format!("malformed request body: {e}"),
                "Send a JSON body with the fields this endpoint expects.",
            )
        })?;
        Ok(Self(value))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorPayload {
    error: bool,
    message: String,
    character: CharacterPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggested_action: Option<String>,
    error_code: String,
    timestamp: String,
}

#[derive(Serialize)]
struct CharacterPayload {
    name: &'static str,
    personality: &'static str,
    catchphrase: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status();
        let character =
            &SPOOKY_CHARACTERS[rand::thread_rng().gen_range(0..SPOOKY_CHARACTERS.len())];

        let message = match status_code {
            404 => "This page has vanished into thin air!".to_string(),
            s if s >= 500 => "Our cauldron seems to be bubbling over!".to_string(),
            _ => self.source.to_string(),
        };
        let suggested_action = self
            .suggested_action
            .clone()
            .or_else(|| self.default_suggestion());

        tracing::error!(status = status_code, error = %self.source, "request failed");

        let payload = ErrorPayload {
            error: true,
            message,
            character: CharacterPayload {
                name: character.name,
                personality: character.personality,
                catchphrase: character.catchphrase,
            },
            suggested_action,
            error_code: format!("SPOOKY_{status_code}"),
            timestamp: Utc::now().to_rfc3339(),
        };

        let status =
            StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(payload)).into_response()
    }
}
