//! Conversation memory.
//!
//! A fixed-capacity sliding window of recent turns. Rendering into prompt
//! text is format-agnostic and happens at read time.

pub mod buffer;

pub use buffer::ConversationBuffer;
