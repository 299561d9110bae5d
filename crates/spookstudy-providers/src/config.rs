//! Provider configuration and source construction.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use spookstudy_core::traits::{QuizSource, StorySource};

use crate::fallback::{FallbackQuizSource, FallbackStorySource};
use crate::gemini::GeminiProvider;
use crate::openai::OpenAiProvider;

/// Configuration for a single AI backend.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAi {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        model: Option<String>,
    },
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        model: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenAi {
                api_key: _,
                base_url,
                model,
            } => f
                .debug_struct("OpenAi")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
                model,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
        }
    }
}

/// Top-level spookstudy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpookstudyConfig {
    /// AI backend configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Backend used for generation; "template" disables remote calls.
    #[serde(default = "default_provider")]
    pub default_provider: String,
}

fn default_provider() -> String {
    "template".to_string()
}

impl Default for SpookstudyConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::OpenAi {
            api_key,
            base_url,
            model,
        } => ProviderConfig::OpenAi {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            model: model.clone(),
        },
        ProviderConfig::Gemini {
            api_key,
            base_url,
            model,
        } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            model: model.clone(),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `spookstudy.toml` in the current directory
/// 2. `~/.config/spookstudy/config.toml`
///
/// Environment variable overrides: `SPOOKSTUDY_OPENAI_KEY`,
/// `SPOOKSTUDY_GEMINI_KEY` (each also selects that backend as the default
/// when none is configured).
pub fn load_config() -> Result<SpookstudyConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<SpookstudyConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("spookstudy.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<SpookstudyConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => SpookstudyConfig::default(),
    };

    // Apply env var overrides
    if let Ok(key) = std::env::var("SPOOKSTUDY_OPENAI_KEY") {
        config
            .providers
            .entry("openai".into())
            .or_insert(ProviderConfig::OpenAi {
                api_key: String::new(),
                base_url: None,
                model: None,
            });
        if let Some(ProviderConfig::OpenAi { api_key, .. }) = config.providers.get_mut("openai") {
            *api_key = key;
        }
        if config.default_provider == "template" {
            config.default_provider = "openai".into();
        }
    }

    if let Ok(key) = std::env::var("SPOOKSTUDY_GEMINI_KEY") {
        config
            .providers
            .entry("gemini".into())
            .or_insert(ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
                model: None,
            });
        if let Some(ProviderConfig::Gemini { api_key, .. }) = config.providers.get_mut("gemini") {
            *api_key = key;
        }
        if config.default_provider == "template" {
            config.default_provider = "gemini".into();
        }
    }

    // Resolve env vars in all provider configs
    let resolved: HashMap<String, ProviderConfig> = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    config.providers = resolved;

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("spookstudy"))
}

/// Build the quiz and story sources the server will serve requests with.
///
/// When the default provider is "template", or its key is empty, both
/// sources are template-only; otherwise the remote backend is wrapped in
/// the fallback composition.
pub fn build_sources(
    config: &SpookstudyConfig,
) -> (FallbackQuizSource, FallbackStorySource) {
    let remote = config
        .providers
        .get(&config.default_provider)
        .and_then(|provider| match provider {
            ProviderConfig::OpenAi {
                api_key,
                base_url,
                model,
            } if !api_key.is_empty() => {
                let quiz: Arc<dyn QuizSource> = Arc::new(OpenAiProvider::new(
                    api_key,
                    base_url.clone(),
                    model.clone(),
                ));
                let story: Arc<dyn StorySource> = Arc::new(OpenAiProvider::new(
                    api_key,
                    base_url.clone(),
                    model.clone(),
                ));
                Some((quiz, story))
            }
            ProviderConfig::Gemini {
                api_key,
                base_url,
                model,
            } if !api_key.is_empty() => {
                let quiz: Arc<dyn QuizSource> = Arc::new(GeminiProvider::new(
                    api_key,
                    base_url.clone(),
                    model.clone(),
                ));
                let story: Arc<dyn StorySource> = Arc::new(GeminiProvider::new(
                    api_key,
                    base_url.clone(),
                    model.clone(),
                ));
                Some((quiz, story))
            }
            _ => None,
        });

    match remote {
        Some((quiz, story)) => {
            info!(backend = %config.default_provider, "AI generation enabled with template fallback");
            (
                FallbackQuizSource::new(Some(quiz)),
                FallbackStorySource::new(Some(story)),
            )
        }
        None => {
            info!("no AI backend configured, template generation only");
            (
                FallbackQuizSource::template_only(),
                FallbackStorySource::template_only(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spookstudy_core::traits::QuizSource as _;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_SPOOKSTUDY_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_SPOOKSTUDY_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_SPOOKSTUDY_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_SPOOKSTUDY_TEST_VAR");
    }

    #[test]
    fn default_config_is_template_only() {
        let config = SpookstudyConfig::default();
        assert_eq!(config.default_provider, "template");
        assert!(config.providers.is_empty());
        let (quiz, _story) = build_sources(&config);
        assert_eq!(quiz.name(), "template");
    }

    #[test]
    fn parse_provider_config() {
        let toml_str = r#"
default_provider = "openai"

[providers.openai]
type = "openai"
api_key = "sk-test"
model = "gpt-4o-mini"

[providers.gemini]
type = "gemini"
api_key = "g-test"
"#;
        let config: SpookstudyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.providers.len(), 2);
        assert!(matches!(
            config.providers.get("openai"),
            Some(ProviderConfig::OpenAi { .. })
        ));
        let (quiz, _story) = build_sources(&config);
        assert_eq!(quiz.name(), "openai");
    }

    #[test]
    fn empty_key_falls_back_to_template() {
        let mut config = SpookstudyConfig::default();
        config.default_provider = "openai".into();
        config.providers.insert(
            "openai".into(),
            ProviderConfig::OpenAi {
                api_key: String::new(),
                base_url: None,
                model: None,
            },
        );
        let (quiz, _story) = build_sources(&config);
        assert_eq!(quiz.name(), "template");
    }

    #[test]
    fn debug_masks_api_keys() {
        let config = ProviderConfig::Gemini {
            api_key: "super-secret".into(),
            base_url: None,
            model: None,
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("***"));
    }

    #[test]
    fn explicit_missing_path_errors() {
        let err = load_config_from(Some(Path::new("/nonexistent/spookstudy.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_path_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spookstudy.toml");
        std::fs::write(&path, "default_provider = \"template\"\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.default_provider, "template");
    }
}
