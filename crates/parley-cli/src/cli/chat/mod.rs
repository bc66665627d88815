//! Interactive chat surface for Parley.
//!
//! Banner, slash commands, async line input, and the loop that feeds each
//! line to a [`parley_core::chat::session::ChatSession`]. Entry point:
//! `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod info;
pub mod input;
pub mod loop_runner;
pub mod startup;
