//! spookstudy-providers — AI generation backends.
//!
//! Implements the `QuizSource` and `StorySource` traits for OpenAI and
//! Gemini, plus the fallback composition that guarantees the deterministic
//! template path serves every request the remote backends cannot.

pub mod config;
pub mod error;
pub mod fallback;
pub mod gemini;
pub mod mock;
pub mod openai;
mod parse;
pub mod prompt;

pub use config::{build_sources, load_config, load_config_from, ProviderConfig, SpookstudyConfig};
pub use error::ProviderError;
pub use fallback::{FallbackQuizSource, FallbackStorySource};
