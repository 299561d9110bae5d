//! Google Gemini generateContent backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use spookstudy_core::error::StudyError;
use spookstudy_core::model::{Quiz, Story};
use spookstudy_core::traits::{QuizRequest, QuizSource, StoryRequest, StorySource};

use crate::error::ProviderError;
use crate::parse::{quiz_from_response, story_from_response};
use crate::prompt::{quiz_prompt, story_prompt, QUIZ_SYSTEM_PROMPT, STORY_SYSTEM_PROMPT};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const MAX_OUTPUT_TOKENS: u32 = 2000;
const TEMPERATURE: f64 = 0.7;

/// Gemini generateContent backend.
pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
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

    async fn generate_content(&self, system: &str, user: String) -> Result<String, ProviderError> {
        let body = GeminiRequest {
            system_instruction: GeminiContent {
                parts: vec![GeminiPart {
                    text: system.to_string(),
                }],
            },
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: user }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
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
            return Err(ProviderError::RateLimited {
                retry_after_ms: 5000,
            });
        }
        if status == 401 || status == 403 {
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

        let api_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("bad envelope: {e}")))?;
        api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| ProviderError::MalformedResponse("no candidates in response".into()))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[async_trait]
impl QuizSource for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, request), fields(model = %self.model, story_id = %request.story_id))]
    async fn generate(&self, request: &QuizRequest) -> Result<Quiz, StudyError> {
        let prompt = quiz_prompt(&request.content, request.difficulty, request.target_count());
        let content = self.generate_content(QUIZ_SYSTEM_PROMPT, prompt).await?;
        Ok(quiz_from_response(&content, request)?)
    }
}

#[async_trait]
impl StorySource for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn generate(&self, request: &StoryRequest) -> Result<Story, StudyError> {
        let prompt = story_prompt(&request.content, &request.topic());
        let content = self.generate_content(STORY_SYSTEM_PROMPT, prompt).await?;
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
            content: "Osmosis moves water across a membrane.".into(),
            difficulty: Difficulty::Easy,
            question_count: Some(1),
        }
    }

    fn gemini_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": text}], "role": "model"}}]
        })
    }

    #[tokio::test]
    async fn successful_quiz_generation() {
        let server = MockServer::start().await;
        let questions = r#"[{"question": "What does osmosis move?", "options": ["Water", "Salt", "Light", "Heat"], "correctAnswer": 0, "explanation": "Osmosis is the movement of water."}]"#;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(questions)))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("test-key", Some(server.uri()), None);
        let quiz = QuizSource::generate(&provider, &quiz_request()).await.unwrap();
        quiz.validate().unwrap();
        assert_eq!(quiz.difficulty, Difficulty::Easy);
    }

    #[tokio::test]
    async fn custom_model_in_path() {
        let server = MockServer::start().await;
        let story = r#"{"title": "🎃 Osmosis Manor", "content": "Water creeps across the membrane of the haunted manor."}"#;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/custom-model:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(story)))
            .mount(&server)
            .await;

        let provider =
            GeminiProvider::new("key", Some(server.uri()), Some("custom-model".into()));
        let request = StoryRequest {
            content: "Osmosis moves water across a membrane.".into(),
            file_name: None,
        };
        let story = StorySource::generate(&provider, &request).await.unwrap();
        assert_eq!(story.title, "🎃 Osmosis Manor");
    }

    #[tokio::test]
    async fn auth_failure_is_upstream_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(403).set_body_string("bad key"))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("key", Some(server.uri()), None);
        let err = QuizSource::generate(&provider, &quiz_request()).await.unwrap_err();
        assert!(matches!(err, StudyError::Upstream(_)));
        assert!(err.to_string().contains("authentication failed"));
    }

    #[tokio::test]
    async fn empty_candidates_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("key", Some(server.uri()), None);
        let err = QuizSource::generate(&provider, &quiz_request()).await.unwrap_err();
        assert!(err.to_string().contains("no candidates"));
    }
}
