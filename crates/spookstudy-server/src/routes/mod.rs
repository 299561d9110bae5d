//! Route table.

use axum::Router;

use crate::state::AppState;

pub mod progress;
pub mod quizzes;
pub mod stories;

/// User id used when a request does not name one.
pub const DEFAULT_USER: &str = "default";

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/stories", stories::router())
        .nest("/api/quizzes", quizzes::router())
        .nest("/api/progress", progress::router())
        .with_state(state)
}
