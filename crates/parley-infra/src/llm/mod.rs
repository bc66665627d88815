//! Generation engine implementations.
//!
//! Each backend speaks to an external inference server over HTTP and
//! implements [`parley_core::llm::generator::TextGenerator`].

pub mod http;
pub mod ollama;
pub mod openai_compat;

use secrecy::SecretString;

use parley_core::llm::box_generator::BoxTextGenerator;
use parley_types::config::{BackendConfig, BackendKind};
use parley_types::llm::GenerationError;

use self::ollama::OllamaGenerator;
use self::openai_compat::OpenAiCompatGenerator;

/// Construct the generator selected by `config`.
pub fn build_generator(
    config: &BackendConfig,
    api_key: Option<SecretString>,
) -> Result<BoxTextGenerator, GenerationError> {
    tracing::debug!(backend = %config.kind, base_url = %config.base_url, model = %config.model, "building generator");
    Ok(match config.kind {
        BackendKind::OpenAi => BoxTextGenerator::new(OpenAiCompatGenerator::new(config, api_key)?),
        BackendKind::Ollama => BoxTextGenerator::new(OllamaGenerator::new(config)?),
    })
}
