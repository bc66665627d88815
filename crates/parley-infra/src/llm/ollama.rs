//! OllamaGenerator -- [`TextGenerator`] over Ollama's native generate API.
//!
//! Sends `raw: true` so Ollama does not wrap the prompt in the model's own
//! chat template; Parley has already formatted it. Ollama has no prompt
//! echo, so `return_full_text` is ignored here.

use serde::{Deserialize, Serialize};

use parley_core::llm::generator::TextGenerator;
use parley_types::config::BackendConfig;
use parley_types::llm::{GenerationError, GenerationParams};

use super::http::{build_client, check_status, join_url, map_send_error};

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    raw: bool,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: u32,
    temperature: f64,
    top_p: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    repeat_penalty: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// Client for a local or remote Ollama server.
#[derive(Debug)]
pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new(config: &BackendConfig) -> Result<Self, GenerationError> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        })
    }

    fn body<'a>(
        &'a self,
        prompt: &'a str,
        params: &GenerationParams,
        stop: &[String],
    ) -> GenerateBody<'a> {
        GenerateBody {
            model: &self.model,
            prompt,
            raw: true,
            stream: false,
            options: GenerateOptions {
                num_predict: params.max_new_tokens,
                temperature: params.effective_temperature(),
                top_p: params.top_p,
                top_k: params.top_k,
                repeat_penalty: params.repetition_penalty,
                stop: stop.to_vec(),
            },
        }
    }

    /// Whether a tag listed by the server names the configured model.
    ///
    /// `tinyllama` matches `tinyllama:latest`.
    fn matches_model(&self, tag: &str) -> bool {
        tag == self.model || tag.split(':').next() == Some(self.model.as_str())
    }
}

impl TextGenerator for OllamaGenerator {
    fn name(&self) -> &str {
        "ollama"
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
        let url = join_url(&self.base_url, "api/generate");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;
        let response = check_status(response).await?;

        let generated: GenerateResponse = response.json().await.map_err(|e| {
            GenerationError::Deserialization(format!("failed to parse response: {e}"))
        })?;
        Ok(generated.response)
    }

    async fn check(&self) -> Result<(), GenerationError> {
        let url = join_url(&self.base_url, "api/tags");
        let response = self.client.get(&url).send().await.map_err(map_send_error)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(GenerationError::Unavailable(format!(
                "{url} not found; is {} an Ollama server?",
                self.base_url
            )));
        }
        let response = check_status(response).await?;

        let tags: TagsResponse = response.json().await.map_err(|e| {
            GenerationError::Deserialization(format!("failed to parse model list: {e}"))
        })?;
        if tags.models.iter().any(|m| self.matches_model(&m.name)) {
            Ok(())
        } else {
            Err(GenerationError::Unavailable(format!(
                "model '{}' not found on {}; pull it with `ollama pull {}`",
                self.model, self.base_url, self.model
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn config(base_url: String) -> BackendConfig {
        BackendConfig {
            kind: parley_types::config::BackendKind::Ollama,
            base_url,
            model: "tinyllama".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_body_maps_params() {
        let generator = OllamaGenerator::new(&config("http://localhost:11434".into())).unwrap();
        let stop = vec!["\nUser:".to_string()];
        let body = serde_json::to_value(generator.body("hi", &GenerationParams::default(), &stop)).unwrap();

        assert_eq!(body["model"], "tinyllama");
        assert_eq!(body["raw"], true);
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["num_predict"], 80);
        assert_eq!(body["options"]["repeat_penalty"], 1.2);
        assert_eq!(body["options"]["stop"][0], "\nUser:");
    }

    #[test]
    fn test_matches_model() {
        let generator = OllamaGenerator::new(&config("http://localhost:11434".into())).unwrap();
        assert!(generator.matches_model("tinyllama"));
        assert!(generator.matches_model("tinyllama:latest"));
        assert!(!generator.matches_model("llama3:8b"));
    }

    #[tokio::test]
    async fn test_generate_reads_response_field() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/generate")
                    .body_contains("\"raw\":true");
                then.status(200).json_body(json!({
                    "model": "tinyllama",
                    "response": "I'm fine.",
                    "done": true
                }));
            })
            .await;

        let generator = OllamaGenerator::new(&config(server.base_url())).unwrap();
        let text = generator
            .generate("User: how are you?\nAssistant:", &GenerationParams::default(), &[])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(text, "I'm fine.");
    }

    #[tokio::test]
    async fn test_generate_rate_limited() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(429);
            })
            .await;

        let generator = OllamaGenerator::new(&config(server.base_url())).unwrap();
        let err = generator
            .generate("x", &GenerationParams::default(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::RateLimited));
    }

    #[tokio::test]
    async fn test_check_finds_model() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/tags");
                then.status(200).json_body(json!({
                    "models": [{ "name": "tinyllama:latest" }, { "name": "llama3:8b" }]
                }));
            })
            .await;

        let generator = OllamaGenerator::new(&config(server.base_url())).unwrap();
        assert!(generator.check().await.is_ok());
    }

    #[tokio::test]
    async fn test_check_missing_model_is_unavailable() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/tags");
                then.status(200).json_body(json!({ "models": [{ "name": "llama3:8b" }] }));
            })
            .await;

        let generator = OllamaGenerator::new(&config(server.base_url())).unwrap();
        let err = generator.check().await.unwrap_err();
        assert!(err.is_init_failure());
        assert!(err.to_string().contains("ollama pull tinyllama"));
    }
}
