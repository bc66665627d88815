//! Sliding-window conversation buffer.
//!
//! Holds at most `2 x window_size` turns, oldest first. Appending past
//! capacity evicts from the head, so the buffer always contains the most
//! recent exchanges in their original order.

use std::collections::VecDeque;

use parley_types::chat::{BufferStats, PromptFormat, Role, Turn};

const INITIAL_CAPACITY: usize = 64;

/// Bounded, insertion-ordered log of conversation turns.
#[derive(Debug, Clone)]
pub struct ConversationBuffer {
    turns: VecDeque<Turn>,
    window_size: usize,
}

impl ConversationBuffer {
    /// Create an empty buffer keeping `window_size` user/assistant pairs.
    ///
    /// A window size of 0 is clamped to 1. Storage grows on demand.
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            turns: VecDeque::with_capacity(window_size.saturating_mul(2).min(INITIAL_CAPACITY)),
            window_size,
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Maximum number of stored turns.
    pub fn capacity(&self) -> usize {
        self.window_size.saturating_mul(2)
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Stored turns, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    /// Add a turn at the tail, evicting from the head past capacity.
    ///
    /// Line breaks in `text` are folded into spaces (see [`Turn::new`]).
    pub fn append(&mut self, role: Role, text: impl Into<String>) {
        self.push(Turn::new(role, text));
    }

    /// Add an already-built turn at the tail.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.capacity() {
            if let Some(evicted) = self.turns.pop_front() {
                tracing::trace!(role = %evicted.role(), "evicted oldest turn");
            }
        }
    }

    /// Text of the most recent user turn, if any.
    pub fn last_user_text(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role() == Role::User)
            .map(Turn::text)
    }

    /// Render the stored turns in the given format.
    pub fn render(&self, format: &PromptFormat) -> String {
        match format {
            PromptFormat::Standard => self
                .turns
                .iter()
                .map(|t| format!("{}: {}", t.role().label(), t.text()))
                .collect::<Vec<_>>()
                .join("\n"),
            PromptFormat::Separator { token } => self
                .turns
                .iter()
                .map(|t| format!("{}{token}", t.text()))
                .collect(),
            PromptFormat::Zephyr => self
                .turns
                .iter()
                .map(|t| format!("<|{}|>\n{}</s>\n", t.role(), t.text()))
                .collect(),
        }
    }

    /// `"<Role>: <text>"` lines, newline-joined. Empty when the buffer is empty.
    pub fn render_standard(&self) -> String {
        self.render(&PromptFormat::Standard)
    }

    /// Turn texts without role labels, each terminated by `separator_token`.
    pub fn render_separator_format(&self, separator_token: &str) -> String {
        self.render(&PromptFormat::Separator {
            token: separator_token.to_string(),
        })
    }

    /// Drop every stored turn.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn stats(&self) -> BufferStats {
        let user_messages = self.turns.iter().filter(|t| t.role() == Role::User).count();
        let assistant_messages = self.turns.len() - user_messages;
        BufferStats {
            turn_count: user_messages.min(assistant_messages),
            message_count: self.turns.len(),
            capacity: self.capacity(),
            user_messages,
            assistant_messages,
        }
    }
}

impl Default for ConversationBuffer {
    fn default() -> Self {
        Self::new(5)
    }
}
