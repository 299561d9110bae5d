//! Error taxonomy shared across the spookstudy crates.
//!
//! Defined in `spookstudy-core` so the server's translation layer can map
//! error kinds to HTTP statuses without string matching.

use thiserror::Error;

/// Errors produced by the generation, scoring, and storage paths.
#[derive(Debug, Error)]
pub enum StudyError {
    /// Missing, oversized, or malformed input. Maps to HTTP 400.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Unknown story, quiz, or user. Maps to HTTP 404.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The builder could not produce valid output from the given input.
    /// Non-retryable without different input. Maps to HTTP 500.
    #[error("generation failed: {0}")]
    GenerationFailed(String),

    /// A remote AI call failed or returned unparseable output. Never
    /// surfaced to HTTP callers — the fallback path consumes it.
    #[error("upstream service error: {0}")]
    Upstream(String),

    /// Flat-file persistence failure. Maps to HTTP 500.
    #[error("storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

impl StudyError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        StudyError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// HTTP status the server's translation layer reports for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            StudyError::Validation(_) => 400,
            StudyError::NotFound { .. } => 404,
            StudyError::GenerationFailed(_)
            | StudyError::Upstream(_)
            | StudyError::Storage(_)
            | StudyError::Io(_)
            | StudyError::Serde(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(StudyError::Validation("x".into()).status_code(), 400);
        assert_eq!(StudyError::not_found("story", "s-1").status_code(), 404);
        assert_eq!(
            StudyError::GenerationFailed("x".into()).status_code(),
            500
        );
    }

    #[test]
    fn not_found_message_names_kind_and_id() {
        let err = StudyError::not_found("quiz", "quiz-9");
        assert_eq!(err.to_string(), "quiz not found: quiz-9");
    }
}
