//! Configuration types for Parley.
//!
//! `ParleyConfig` represents the top-level `config.toml` that controls the
//! memory window, prompt format, generation backend and response cleaning.
//! Every field has a default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::chat::PromptFormat;
use crate::error::ConfigError;
use crate::llm::GenerationParams;

/// Persona the assistant is primed with in role-tagged formats.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant. Provide concise, accurate answers. \
If you don't know something, say so instead of guessing. Keep responses brief and factual.";

/// Largest accepted `window_size`.
pub const MAX_WINDOW_SIZE: usize = 1024;

/// Top-level configuration.
///
/// Loaded from `~/.parley/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParleyConfig {
    /// Number of user/assistant exchanges kept in memory.
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    #[serde(default)]
    pub format: PromptFormat,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub generation: GenerationParams,

    #[serde(default)]
    pub cleaning: CleaningConfig,
}

fn default_window_size() -> usize {
    5
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

impl Default for ParleyConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            system_prompt: default_system_prompt(),
            format: PromptFormat::default(),
            backend: BackendConfig::default(),
            generation: GenerationParams::default(),
            cleaning: CleaningConfig::default(),
        }
    }
}

impl ParleyConfig {
    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.window_size > MAX_WINDOW_SIZE {
            return Err(ConfigError::WindowTooLarge {
                got: self.window_size,
                max: MAX_WINDOW_SIZE,
            });
        }
        if let PromptFormat::Separator { token } = &self.format {
            if token.trim().is_empty() {
                return Err(ConfigError::BlankSeparator);
            }
        }

        let generation = &self.generation;
        if generation.max_new_tokens == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "max_new_tokens",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(generation.temperature >= 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "temperature",
                reason: format!("must be >= 0, got {}", generation.temperature),
            });
        }
        if !(generation.top_p > 0.0 && generation.top_p <= 1.0) {
            return Err(ConfigError::InvalidParameter {
                name: "top_p",
                reason: format!("must be in (0, 1], got {}", generation.top_p),
            });
        }
        if !(generation.repetition_penalty > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "repetition_penalty",
                reason: format!("must be > 0, got {}", generation.repetition_penalty),
            });
        }

        if self.backend.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidBackend("base_url is empty".to_string()));
        }
        if !self.backend.base_url.starts_with("http://")
            && !self.backend.base_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidBackend(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.backend.base_url
            )));
        }
        if self.backend.model.trim().is_empty() {
            return Err(ConfigError::InvalidBackend("model is empty".to_string()));
        }
        Ok(())
    }
}

/// Which HTTP protocol the generation engine speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// OpenAI-compatible text completions (`/v1/completions`).
    #[default]
    OpenAi,
    /// Ollama native generate API (`/api/generate`).
    Ollama,
}

impl BackendKind {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            BackendKind::OpenAi => "http://127.0.0.1:8080/v1",
            BackendKind::Ollama => "http://127.0.0.1:11434",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::OpenAi => write!(f, "openai"),
            BackendKind::Ollama => write!(f, "ollama"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "openai-compat" => Ok(BackendKind::OpenAi),
            "ollama" => Ok(BackendKind::Ollama),
            other => Err(format!("invalid backend: '{other}'")),
        }
    }
}

/// Connection settings for the generation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable holding the API key, if any.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// HTTP timeout for a single generation request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    BackendKind::OpenAi.default_base_url().to_string()
}

fn default_model() -> String {
    "TinyLlama/TinyLlama-1.1B-Chat-v1.0".to_string()
}

fn default_api_key_env() -> String {
    "PARLEY_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Limits applied when post-processing generated replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningConfig {
    #[serde(default = "default_max_sentences")]
    pub max_sentences: usize,

    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Additional speaker labels (without the colon) to strip and cut at.
    #[serde(default)]
    pub extra_labels: Vec<String>,
}

fn default_max_sentences() -> usize {
    3
}

fn default_max_chars() -> usize {
    300
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            max_sentences: default_max_sentences(),
            max_chars: default_max_chars(),
            extra_labels: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = ParleyConfig::default();
        assert_eq!(config.window_size, 5);
        assert_eq!(config.format, PromptFormat::Standard);
        assert_eq!(config.backend.kind, BackendKind::OpenAi);
        assert_eq!(config.backend.timeout_secs, 120);
        assert_eq!(config.cleaning.max_sentences, 3);
        assert_eq!(config.cleaning.max_chars, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialize_empty() {
        let config: ParleyConfig = toml::from_str("").unwrap();
        assert_eq!(config, ParleyConfig::default());
    }

    #[test]
    fn test_config_deserialize_with_values() {
        let toml_str = r#"
window_size = 2
system_prompt = "Be terse."

[format]
kind = "separator"
token = "<|endoftext|>"

[backend]
kind = "ollama"
base_url = "http://localhost:11434"
model = "tinyllama"

[generation]
max_new_tokens = 40
temperature = 0.7

[cleaning]
max_sentences = 2
extra_labels = ["Narrator"]
"#;
        let config: ParleyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.window_size, 2);
        assert_eq!(config.system_prompt, "Be terse.");
        assert_eq!(config.format, PromptFormat::separator());
        assert_eq!(config.backend.kind, BackendKind::Ollama);
        assert_eq!(config.backend.model, "tinyllama");
        assert_eq!(config.backend.api_key_env, "PARLEY_API_KEY");
        assert_eq!(config.generation.max_new_tokens, 40);
        assert!((config.generation.top_p - 0.85).abs() < f64::EPSILON);
        assert_eq!(config.cleaning.max_sentences, 2);
        assert_eq!(config.cleaning.max_chars, 300);
        assert_eq!(config.cleaning.extra_labels, vec!["Narrator".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let config = ParleyConfig {
            window_size: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroWindow)));
    }

    #[test]
    fn test_validate_bounds_window() {
        let at_max = ParleyConfig {
            window_size: MAX_WINDOW_SIZE,
            ..Default::default()
        };
        assert!(at_max.validate().is_ok());

        for window_size in [MAX_WINDOW_SIZE + 1, 10_000_000_000, usize::MAX / 2 + 1] {
            let config = ParleyConfig {
                window_size,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::WindowTooLarge { got, max: MAX_WINDOW_SIZE }) if got == window_size
            ));
        }
    }

    #[test]
    fn test_validate_rejects_blank_separator() {
        let config = ParleyConfig {
            format: PromptFormat::Separator {
                token: "  ".to_string(),
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::BlankSeparator)));
    }

    #[test]
    fn test_validate_rejects_bad_sampling_knobs() {
        let mut config = ParleyConfig::default();
        config.generation.top_p = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParameter { name: "top_p", .. })
        ));

        let mut config = ParleyConfig::default();
        config.generation.temperature = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParameter {
                name: "temperature",
                ..
            })
        ));

        let mut config = ParleyConfig::default();
        config.generation.max_new_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_backend() {
        let mut config = ParleyConfig::default();
        config.backend.base_url = "localhost:8080".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBackend(_))
        ));

        let mut config = ParleyConfig::default();
        config.backend.model = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!("openai".parse::<BackendKind>().unwrap(), BackendKind::OpenAi);
        assert_eq!("Ollama".parse::<BackendKind>().unwrap(), BackendKind::Ollama);
        assert!("llamafile".parse::<BackendKind>().is_err());
        assert_eq!(BackendKind::Ollama.to_string(), "ollama");
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = ParleyConfig {
            window_size: 3,
            format: PromptFormat::Zephyr,
            ..Default::default()
        };
        let text = toml::to_string(&config).unwrap();
        let parsed: ParleyConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
