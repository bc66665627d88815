//! Chat session: one conversation with one generation engine.
//!
//! The session owns the conversation buffer and the generator handle, so
//! independent sessions can coexist and tests need no process-wide state.
//! A turn is committed to memory only after the engine produced a usable
//! reply; a failed generation leaves the buffer exactly as it was.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use parley_types::chat::{BufferStats, PromptFormat, Role};
use parley_types::config::ParleyConfig;
use parley_types::error::ConfigError;
use parley_types::llm::{GenerationError, GenerationParams};

use crate::llm::generator::TextGenerator;
use crate::memory::ConversationBuffer;

use super::cleaner::ResponseCleaner;
use super::prompt::PromptBuilder;

/// A cleaned reply plus what it was cleaned from.
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub raw: String,
    pub elapsed: Duration,
}

pub struct ChatSession<G> {
    id: Uuid,
    started_at: DateTime<Utc>,
    buffer: ConversationBuffer,
    prompt_builder: PromptBuilder,
    cleaner: ResponseCleaner,
    params: GenerationParams,
    generator: G,
    exchanges: u64,
    failures: u64,
}

impl<G: TextGenerator> ChatSession<G> {
    /// Create a session from validated configuration.
    pub fn new(config: &ParleyConfig, generator: G) -> Result<Self, ConfigError> {
        config.validate()?;
        let cleaner = ResponseCleaner::new(&config.cleaning, &config.format)?;
        Ok(Self {
            id: Uuid::now_v7(),
            started_at: Utc::now(),
            buffer: ConversationBuffer::new(config.window_size),
            prompt_builder: PromptBuilder::new(config.system_prompt.clone(), config.format.clone()),
            cleaner,
            params: config.generation.clone(),
            generator,
            exchanges: 0,
            failures: 0,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn buffer(&self) -> &ConversationBuffer {
        &self.buffer
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    pub fn format(&self) -> &PromptFormat {
        self.prompt_builder.format()
    }

    /// Completed exchanges over the whole session, including evicted ones.
    pub fn exchanges(&self) -> u64 {
        self.exchanges
    }

    /// Failed generation attempts over the whole session.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn stats(&self) -> BufferStats {
        self.buffer.stats()
    }

    /// Forget the conversation so far.
    pub fn clear(&mut self) {
        let dropped = self.buffer.len();
        self.buffer.clear();
        tracing::info!(session_id = %self.id, dropped, "conversation memory cleared");
    }

    /// Run one chat turn: prompt the engine with `input` and the buffered
    /// history, clean the output, and commit both turns to memory.
    ///
    /// On error nothing is committed and the session stays usable.
    pub async fn respond(&mut self, input: &str) -> Result<Reply, GenerationError> {
        let input = input.trim();
        let prompt = self.prompt_builder.build(&self.buffer, input);
        let stop = self.prompt_builder.stop_sequences();
        tracing::debug!(
            session_id = %self.id,
            prompt_chars = prompt.len(),
            history = self.buffer.len(),
            "sending prompt"
        );

        let start = Instant::now();
        let raw = match self.generator.generate(&prompt, &self.params, &stop).await {
            Ok(raw) if raw.trim().is_empty() => {
                self.failures += 1;
                tracing::warn!(session_id = %self.id, "engine returned empty output");
                return Err(GenerationError::EmptyOutput);
            }
            Ok(raw) => raw,
            Err(e) => {
                self.failures += 1;
                tracing::warn!(session_id = %self.id, error = %e, "generation failed");
                return Err(e);
            }
        };
        let elapsed = start.elapsed();

        let text = self.cleaner.clean(&raw, &prompt);
        tracing::debug!(
            raw_chars = raw.len(),
            clean_chars = text.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "reply cleaned"
        );

        self.buffer.append(Role::User, input);
        self.buffer.append(Role::Assistant, text.clone());
        self.exchanges += 1;

        Ok(Reply { text, raw, elapsed })
    }
}
