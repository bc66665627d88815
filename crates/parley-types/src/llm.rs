//! Generation request parameters and errors.
//!
//! These types model the contract with the external text-generation engine.
//! The sampling knobs are opaque to the rest of Parley: they are forwarded
//! to whichever backend is configured.

use serde::{Deserialize, Serialize};

/// Parameters forwarded to the generation engine with every prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Upper bound on the number of generated tokens.
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Nucleus-sampling cutoff.
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default = "default_top_k", skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default = "default_repetition_penalty")]
    pub repetition_penalty: f64,
    /// Stochastic sampling; greedy decoding when false.
    #[serde(default = "default_sample")]
    pub sample: bool,
    /// Ask the engine to echo the prompt in front of the completion.
    #[serde(default)]
    pub return_full_text: bool,
}

fn default_max_new_tokens() -> u32 {
    80
}

fn default_temperature() -> f64 {
    0.3
}

fn default_top_p() -> f64 {
    0.85
}

fn default_top_k() -> Option<u32> {
    Some(30)
}

fn default_repetition_penalty() -> f64 {
    1.2
}

fn default_sample() -> bool {
    true
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: default_max_new_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            repetition_penalty: default_repetition_penalty(),
            sample: default_sample(),
            return_full_text: false,
        }
    }
}

impl GenerationParams {
    /// Temperature actually sent to the engine (0 when sampling is disabled).
    pub fn effective_temperature(&self) -> f64 {
        if self.sample { self.temperature } else { 0.0 }
    }
}

/// Errors from the external generation engine.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("generation timed out")]
    Timeout,

    #[error("engine returned no usable text")]
    EmptyOutput,

    #[error("rate limited")]
    RateLimited,

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("engine unavailable: {0}")]
    Unavailable(String),
}

impl GenerationError {
    /// Whether this error means the engine cannot be used at all.
    ///
    /// Raised during startup these terminate the process; raised during a
    /// chat turn they are reported like any other failure.
    pub fn is_init_failure(&self) -> bool {
        matches!(
            self,
            GenerationError::Unavailable(_) | GenerationError::AuthenticationFailed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_params_defaults() {
        let params = GenerationParams::default();
        assert_eq!(params.max_new_tokens, 80);
        assert!((params.temperature - 0.3).abs() < f64::EPSILON);
        assert!((params.top_p - 0.85).abs() < f64::EPSILON);
        assert_eq!(params.top_k, Some(30));
        assert!((params.repetition_penalty - 1.2).abs() < f64::EPSILON);
        assert!(params.sample);
        assert!(!params.return_full_text);
    }

    #[test]
    fn test_effective_temperature_greedy() {
        let params = GenerationParams {
            sample: false,
            ..Default::default()
        };
        assert_eq!(params.effective_temperature(), 0.0);
        assert!((GenerationParams::default().effective_temperature() - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_generation_params_partial_toml() {
        let params: GenerationParams = toml::from_str("max_new_tokens = 120\nsample = false").unwrap();
        assert_eq!(params.max_new_tokens, 120);
        assert!(!params.sample);
        assert!((params.top_p - 0.85).abs() < f64::EPSILON);
        assert_eq!(params.top_k, Some(30));
    }

    #[test]
    fn test_generation_error_display() {
        let err = GenerationError::Provider {
            message: "HTTP 500".to_string(),
        };
        assert_eq!(err.to_string(), "provider error: HTTP 500");
        assert_eq!(
            GenerationError::Unavailable("connection refused".to_string()).to_string(),
            "engine unavailable: connection refused"
        );
    }

    #[test]
    fn test_init_failure_classification() {
        assert!(GenerationError::Unavailable("x".to_string()).is_init_failure());
        assert!(GenerationError::AuthenticationFailed.is_init_failure());
        assert!(!GenerationError::Timeout.is_init_failure());
        assert!(!GenerationError::EmptyOutput.is_init_failure());
    }
}
