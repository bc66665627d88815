//! OpenAiCompatGenerator -- [`TextGenerator`] over the OpenAI text
//! completions protocol (`POST /v1/completions`).
//!
//! Served by llama.cpp's server, vLLM, LM Studio and most local inference
//! servers. Non-standard sampling fields (`top_k`, `repetition_penalty`)
//! are sent alongside the standard ones; servers that do not know them
//! ignore them.
//!
//! The optional API key is wrapped in [`secrecy::SecretString`] and is never
//! logged or included in `Debug` output.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use parley_core::llm::generator::TextGenerator;
use parley_types::config::BackendConfig;
use parley_types::llm::{GenerationError, GenerationParams};

use super::http::{build_client, check_status, join_url, map_send_error};

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    repetition_penalty: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
    echo: bool,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

/// Maximum number of stop sequences the OpenAI protocol accepts.
const MAX_STOP_SEQUENCES: usize = 4;

/// Text-completion client for OpenAI-compatible servers.
pub struct OpenAiCompatGenerator {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
}

impl OpenAiCompatGenerator {
    pub fn new(
        config: &BackendConfig,
        api_key: Option<SecretString>,
    ) -> Result<Self, GenerationError> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            api_key,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        })
    }

    fn body<'a>(
        &'a self,
        prompt: &'a str,
        params: &GenerationParams,
        stop: &[String],
    ) -> CompletionBody<'a> {
        CompletionBody {
            model: &self.model,
            prompt,
            max_tokens: params.max_new_tokens,
            temperature: params.effective_temperature(),
            top_p: params.top_p,
            top_k: params.top_k,
            repetition_penalty: params.repetition_penalty,
            stop: stop.iter().take(MAX_STOP_SEQUENCES).cloned().collect(),
            echo: params.return_full_text,
            stream: false,
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key.expose_secret()),
            None => request,
        }
    }
}

// No Debug derive: keeps the API key out of formatted output entirely.

impl TextGenerator for OpenAiCompatGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
        stop: &[String],
    ) -> Result<String, GenerationError> {
        let body = self.body(prompt, params, stop);
        let url = join_url(&self.base_url, "completions");

        let response = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;
        let response = check_status(response).await?;

        let completion: CompletionResponse = response.json().await.map_err(|e| {
            GenerationError::Deserialization(format!("failed to parse response: {e}"))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or(GenerationError::EmptyOutput)
    }

    async fn check(&self) -> Result<(), GenerationError> {
        let url = join_url(&self.base_url, "models");
        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(map_send_error)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(GenerationError::Unavailable(format!(
                "{url} not found; is {} an OpenAI-compatible endpoint?",
                self.base_url
            )));
        }
        check_status(response).await?;
        Ok(())
    }
}
