//! Remote-with-template fallback composition.
//!
//! Wraps an optional remote backend around the deterministic template
//! builders. Any remote failure — network, auth, rate limit, unparseable or
//! shape-invalid output — is logged and permanently substituted with the
//! template result for that call. This is not a retry; the HTTP caller never
//! sees an upstream error.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use spookstudy_core::error::StudyError;
use spookstudy_core::model::{Quiz, Story};
use spookstudy_core::quizgen::TemplateQuizSource;
use spookstudy_core::storygen::TemplateStorySource;
use spookstudy_core::traits::{QuizRequest, QuizSource, StoryRequest, StorySource};

/// Quiz source that tries a remote backend first and always lands on the
/// template builder.
pub struct FallbackQuizSource {
    remote: Option<Arc<dyn QuizSource>>,
    template: TemplateQuizSource,
}

impl FallbackQuizSource {
    pub fn new(remote: Option<Arc<dyn QuizSource>>) -> Self {
        Self {
            remote,
            template: TemplateQuizSource::new(),
        }
    }

    /// Template-only source, for deployments without an API key.
    pub fn template_only() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl QuizSource for FallbackQuizSource {
    fn name(&self) -> &str {
        match &self.remote {
            Some(remote) => remote.name(),
            None => self.template.name(),
        }
    }

    async fn generate(&self, request: &QuizRequest) -> Result<Quiz, StudyError> {
        if let Some(remote) = &self.remote {
            match remote.generate(request).await {
                Ok(quiz) => match quiz.validate() {
                    Ok(()) => return Ok(quiz),
                    Err(e) => {
                        warn!(backend = remote.name(), error = %e, "remote quiz failed validation, using template");
                    }
                },
                Err(e) => {
                    warn!(backend = remote.name(), error = %e, "remote quiz generation failed, using template");
                }
            }
        }
        self.template.generate(request).await
    }
}

/// Story source with the same remote-then-template policy.
pub struct FallbackStorySource {
    remote: Option<Arc<dyn StorySource>>,
    template: TemplateStorySource,
}

impl FallbackStorySource {
    pub fn new(remote: Option<Arc<dyn StorySource>>) -> Self {
        Self {
            remote,
            template: TemplateStorySource::new(),
        }
    }

    pub fn template_only() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl StorySource for FallbackStorySource {
    fn name(&self) -> &str {
        match &self.remote {
            Some(remote) => remote.name(),
            None => self.template.name(),
        }
    }

    async fn generate(&self, request: &StoryRequest) -> Result<Story, StudyError> {
        if let Some(remote) = &self.remote {
            match remote.generate(request).await {
                Ok(story) => return Ok(story),
                Err(e) => {
                    warn!(backend = remote.name(), error = %e, "remote story generation failed, using template");
                }
            }
        }
        self.template.generate(request).await
    }
}
