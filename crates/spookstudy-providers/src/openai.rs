//! OpenAI chat-completions backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use spookstudy_core::error::StudyError;
use spookstudy_core::model::{Quiz, Story};
use spookstudy_core::traits::{QuizRequest, QuizSource, StoryRequest, StorySource};

use crate::error::ProviderError;
use crate::parse::{quiz_from_response, story_from_response};
use crate::prompt::{quiz_prompt, story_prompt, QUIZ_SYSTEM_PROMPT, STORY_SYSTEM_PROMPT};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const MAX_TOKENS: u32 = 2000;
const TEMPERATURE: f64 = 0.7;

/// OpenAI-compatible chat completion backend.
pub struct OpenAiProvider {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, base_url: Option<String>, model: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client,
        }
    }

    async fn chat(&self, system: &str, user: String) -> Result<String, ProviderError> {
        let body = OpenAiRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            messages: vec![
                OpenAiMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                OpenAiMessage {
                    role: "user".to_string(),
                    content: user,
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    ProviderError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(ProviderError::RateLimited {
                retry_after_ms: retry_after,
            });
        }
        if status == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::AuthenticationFailed(body));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status,
                message: body,
            });
        }

        let api_response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("bad envelope: {e}")))?;
        api_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ProviderError::MalformedResponse("no choices in response".into()))
    }
}

#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    max_tokens: u32,
    temperature: f64,
    messages: Vec<OpenAiMessage>,
}

#[derive(Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiChoiceMessage,
}

#[derive(Deserialize)]
struct OpenAiChoiceMessage {
    content: String,
}

#[async_trait]
impl QuizSource for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, request), fields(model = %self.model, story_id = %request.story_id))]
    async fn generate(&self, request: &QuizRequest) -> Result<Quiz, StudyError> {
        let prompt = quiz_prompt(&request.content, request.difficulty, request.target_count());
        let content = self.chat(QUIZ_SYSTEM_PROMPT, prompt).await?;
        Ok(quiz_from_response(&content, request)?)
    }
}

#[async_trait]
impl StorySource for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn generate(&self, request: &StoryRequest) -> Result<Story, StudyError> {
        let prompt = story_prompt(&request.content, &request.topic());
        let content = self.chat(STORY_SYSTEM_PROMPT, prompt).await?;
        Ok(story_from_response(&content, request)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spookstudy_core::model::Difficulty;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn quiz_request() -> QuizRequest {
        QuizRequest {
            story_id: "story-1".into(),
            content: "Mitosis divides one cell into two identical cells.".into(),
            difficulty: Difficulty::Medium,
            question_count: Some(1),
        }
    }

    fn chat_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{"message": {"content": content, "role": "assistant"}, "index": 0}],
            "model": "gpt-4o-mini"
        })
    }

    #[tokio::test]
    async fn successful_quiz_generation() {
        let server = MockServer::start().await;
        let questions = r#"[{"question": "What does mitosis produce?", "options": ["Two identical cells", "One larger cell", "Four spores", "A new organism"], "correctAnswer": 0, "explanation": "Mitosis yields two identical daughter cells."}]"#;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(questions)))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new("test-key", Some(server.uri()), None);
        let quiz = QuizSource::generate(&provider, &quiz_request()).await.unwrap();
        assert_eq!(quiz.questions.len(), 1);
        assert_eq!(quiz.story_id, "story-1");
        quiz.validate().unwrap();
    }

    #[tokio::test]
    async fn fenced_response_is_parsed() {
        let server = MockServer::start().await;
        let fenced = "```json\n[{\"question\": \"q?\", \"options\": [\"a\", \"b\", \"c\", \"d\"], \"correctAnswer\": 2, \"explanation\": \"e\"}]\n```";

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(fenced)))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new("key", Some(server.uri()), None);
        let quiz = QuizSource::generate(&provider, &quiz_request()).await.unwrap();
        assert_eq!(quiz.questions[0].correct_answer, 2);
    }

    #[tokio::test]
    async fn malformed_response_is_upstream_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("I cannot do that")))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new("key", Some(server.uri()), None);
        let err = QuizSource::generate(&provider, &quiz_request()).await.unwrap_err();
        assert!(matches!(err, StudyError::Upstream(_)));
    }

    #[tokio::test]
    async fn server_error_is_upstream_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new("key", Some(server.uri()), None);
        let err = QuizSource::generate(&provider, &quiz_request()).await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn story_generation_roundtrip() {
        let server = MockServer::start().await;
        let story = r#"{"title": "🎃 The Cell Cauldron", "content": "In the haunted lab, mitosis divides one cell into two identical cells."}"#;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(story)))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new("key", Some(server.uri()), None);
        let request = StoryRequest {
            content: "Mitosis divides one cell into two identical cells.".into(),
            file_name: None,
        };
        let story = StorySource::generate(&provider, &request).await.unwrap();
        assert_eq!(story.title, "🎃 The Cell Cauldron");
        assert_eq!(story.original_topic, "Direct text input");
    }
}
