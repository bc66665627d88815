//! Scripted generator returning canned outputs in order.
//!
//! Records every prompt it receives so tests can assert on prompt assembly.

use std::collections::VecDeque;
use std::sync::Mutex;

use parley_types::llm::{GenerationError, GenerationParams};

use super::generator::TextGenerator;

pub struct ScriptedGenerator {
    outputs: Mutex<VecDeque<Result<String, GenerationError>>>,
    prompts: Mutex<Vec<String>>,
    check_error: Option<GenerationError>,
}

impl ScriptedGenerator {
    pub fn new(outputs: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            outputs: Mutex::new(outputs.into()),
            prompts: Mutex::new(Vec::new()),
            check_error: None,
        }
    }

    /// A generator whose availability check fails with `err`.
    pub fn failing_check(err: GenerationError) -> Self {
        Self {
            check_error: Some(err),
            ..Self::new(Vec::new())
        }
    }

    /// A generator whose engine cannot be reached at all.
    pub fn unavailable() -> Self {
        Self::failing_check(GenerationError::Unavailable("scripted".to_string()))
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
        _stop: &[String],
    ) -> Result<String, GenerationError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        let next = self
            .outputs
            .lock()
            .ok()
            .and_then(|mut outputs| outputs.pop_front());
        next.unwrap_or(Err(GenerationError::EmptyOutput))
    }

    async fn check(&self) -> Result<(), GenerationError> {
        match &self.check_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
