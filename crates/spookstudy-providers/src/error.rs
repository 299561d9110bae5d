//! Provider error types.

use thiserror::Error;

use spookstudy_core::error::StudyError;

/// Errors that can occur when calling a remote AI backend.
///
/// Every variant converts into [`StudyError::Upstream`], which the fallback
/// composition consumes; none of these ever reach an HTTP caller.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The model's response could not be parsed into the expected shape.
    #[error("malformed model response: {0}")]
    MalformedResponse(String),
}

impl From<ProviderError> for StudyError {
    fn from(e: ProviderError) -> Self {
        StudyError::Upstream(e.to_string())
    }
}
