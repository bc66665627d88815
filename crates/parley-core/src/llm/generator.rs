//! TextGenerator trait definition.
//!
//! The external engine is a black box exposing one capability:
//! `generate(prompt, params) -> text`. It may be slow and it may fail;
//! callers report failures and carry on. No retries or timeouts live here.

use std::future::Future;

use parley_types::llm::{GenerationError, GenerationParams};

/// Trait for text-generation backends (OpenAI-compatible servers, Ollama, ...).
///
/// Implementations live in parley-infra.
pub trait TextGenerator: Send + Sync {
    /// Human-readable backend name (e.g., "openai", "ollama").
    fn name(&self) -> &str;

    /// Model identifier the backend was configured with.
    fn model(&self) -> &str;

    /// Generate a continuation of `prompt`.
    ///
    /// `stop` lists sequences at which the engine should stop; engines that
    /// ignore them are fine, the reply is cleaned afterwards anyway.
    fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
        stop: &[String],
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;

    /// Verify the engine is reachable and the model is available.
    fn check(&self) -> impl Future<Output = Result<(), GenerationError>> + Send;
}
