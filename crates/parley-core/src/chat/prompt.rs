//! Prompt assembly for a new user input.
//!
//! `PromptBuilder` combines the system preamble, a read-only snapshot of the
//! conversation buffer, and the pending input into the text handed to the
//! generation engine. The pending input is not part of the buffer yet; it
//! is committed only after a successful generation.

use parley_types::chat::{PromptFormat, Role};

use crate::memory::ConversationBuffer;

/// Builds prompts in one of the supported formats.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system_prompt: String,
    format: PromptFormat,
}

impl PromptBuilder {
    pub fn new(system_prompt: impl Into<String>, format: PromptFormat) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            format,
        }
    }

    pub fn format(&self) -> &PromptFormat {
        &self.format
    }

    /// Build the full prompt for `input` on top of the buffered history.
    pub fn build(&self, history: &ConversationBuffer, input: &str) -> String {
        match &self.format {
            PromptFormat::Standard => {
                let mut prompt = String::new();
                let system = self.system_prompt.trim();
                if !system.is_empty() {
                    prompt.push_str(system);
                    prompt.push_str("\n\n");
                }
                let rendered = history.render_standard();
                if !rendered.is_empty() {
                    prompt.push_str(&rendered);
                    prompt.push('\n');
                }
                prompt.push_str(&format!(
                    "{}: {input}\n{}:",
                    Role::User.label(),
                    Role::Assistant.label()
                ));
                prompt
            }
            PromptFormat::Separator { token } => {
                format!("{}{input}{token}", history.render_separator_format(token))
            }
            PromptFormat::Zephyr => {
                let mut prompt = String::new();
                let system = self.system_prompt.trim();
                if !system.is_empty() {
                    prompt.push_str(&format!("<|system|>\n{system}</s>\n"));
                }
                prompt.push_str(&history.render(&self.format));
                prompt.push_str(&format!("<|user|>\n{input}</s>\n<|assistant|>\n"));
                prompt
            }
        }
    }

    /// Strings marking the start of the next speaker's turn.
    ///
    /// Forwarded to the engine so generation stops at a turn boundary.
    pub fn stop_sequences(&self) -> Vec<String> {
        match &self.format {
            PromptFormat::Standard => vec![
                format!("\n{}:", Role::User.label()),
                format!("\n{}:", Role::Assistant.label()),
            ],
            PromptFormat::Separator { token } => vec![token.clone()],
            PromptFormat::Zephyr => vec!["</s>".to_string(), "<|user|>".to_string()],
        }
    }
}
