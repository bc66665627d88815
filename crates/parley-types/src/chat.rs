//! Conversation types: roles, turns, prompt formats and buffer statistics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator token used by GPT-2 style dialogue models (DialoGPT).
pub const DEFAULT_SEPARATOR_TOKEN: &str = "<|endoftext|>";

/// Speaker of a turn in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Capitalised label used when rendering role-tagged prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("invalid role: '{other}'")),
        }
    }
}

/// One role-tagged message in a conversation.
///
/// Turns are immutable once created; the fields are only readable through
/// accessors. Text is always a single line: line breaks collapse to one
/// space so a rendered history keeps one line per turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    text: String,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        let text = text.into();
        let text = if text.contains(['\n', '\r']) {
            text.split(['\n', '\r'])
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            text
        };
        Self { role, text }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// How the conversation history is serialized into a prompt.
///
/// Different model families expect different priming conventions. The
/// buffer stays format-agnostic; the caller picks one of these at render time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromptFormat {
    /// `"<Role>: <text>"` lines, newline-joined.
    #[default]
    Standard,
    /// Turn texts only, each terminated by a model-specific separator token.
    Separator {
        #[serde(default = "default_separator_token")]
        token: String,
    },
    /// Zephyr/TinyLlama chat template (`<|user|>` ... `</s>` blocks).
    Zephyr,
}

fn default_separator_token() -> String {
    DEFAULT_SEPARATOR_TOKEN.to_string()
}

impl PromptFormat {
    /// Separator format with the default GPT-2 end-of-text token.
    pub fn separator() -> Self {
        PromptFormat::Separator {
            token: default_separator_token(),
        }
    }

    /// Short name used on the command line and in the banner.
    pub fn name(&self) -> &'static str {
        match self {
            PromptFormat::Standard => "standard",
            PromptFormat::Separator { .. } => "separator",
            PromptFormat::Zephyr => "zephyr",
        }
    }
}

impl fmt::Display for PromptFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptFormat::Separator { token } => write!(f, "separator ({token})"),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Read-only snapshot of a conversation buffer's occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferStats {
    /// Complete user/assistant exchanges currently held.
    pub turn_count: usize,
    /// Stored turns (user and assistant messages).
    pub message_count: usize,
    /// Maximum number of stored turns (2 x window size).
    pub capacity: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
}

impl BufferStats {
    /// Fraction of the capacity in use, as a percentage.
    pub fn usage_percent(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.message_count as f64 / self.capacity as f64 * 100.0
    }
}
