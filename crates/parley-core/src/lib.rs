//! Conversation core for Parley.
//!
//! This crate holds the reusable logic of the chat agent: the sliding-window
//! conversation buffer, prompt assembly, response cleaning, the session
//! object that ties them together, and the `TextGenerator` port that
//! concrete engines in `parley-infra` implement. It depends only on
//! `parley-types` -- never on `parley-infra` or any HTTP crate.

pub mod chat;
pub mod llm;
pub mod memory;
