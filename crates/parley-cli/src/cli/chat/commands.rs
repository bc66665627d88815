//! Slash command parsing for the chat loop.
//!
//! Commands start with `/` and are matched case-insensitively. They never
//! reach the generation engine.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Forget the conversation so far.
    Clear,
    /// Show memory statistics.
    Info,
    /// Exit the chat session.
    Exit,
    /// Unknown command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_lowercase();

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" => Some(ChatCommand::Clear),
        "/info" | "/stats" => Some(ChatCommand::Info),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        _ => Some(ChatCommand::Unknown(cmd)),
    }
}

/// Print the help text listing all available commands.
pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}   {}", style("/exit").cyan(), "Exit the chat");
    println!("  {}  {}", style("/clear").cyan(), "Clear conversation memory");
    println!("  {}   {}", style("/info").cyan(), "Show memory statistics");
    println!("  {}   {}", style("/help").cyan(), "Show this help message");
    println!();
    println!("  {}", style("Ctrl+D to exit").dim());
    println!();
}
