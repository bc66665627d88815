//! Main chat loop orchestration.
//!
//! Reads lines, dispatches slash commands, and runs every other line through
//! the session. A failed generation is reported and the loop keeps going;
//! only `/exit`, Ctrl+D, or a broken terminal end it.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use parley_core::chat::session::ChatSession;
use parley_core::llm::generator::TextGenerator;

use super::banner::welcome_banner;
use super::commands::{self, ChatCommand};
use super::info::{print_info, SessionInfo};
use super::input::{ChatInput, InputEvent};

/// Whether the loop should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// Run the interactive chat loop until the user leaves.
///
/// `quiet` skips the welcome banner.
pub async fn run_chat_loop<G: TextGenerator>(
    mut session: ChatSession<G>,
    quiet: bool,
) -> anyhow::Result<()> {
    if let Some(banner) = session_banner(&session, quiet) {
        println!("{banner}");
    }
    tracing::info!(session_id = %session.id(), "chat session started");

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        match chat_input.read_line().await {
            InputEvent::Eof => {
                print_goodbye();
                break;
            }
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D or type /exit to leave.").dim());
            }
            InputEvent::Message(text) => {
                if handle_line(&mut session, &text).await == LoopControl::Exit {
                    break;
                }
            }
        }
    }

    chat_input.flush();
    tracing::info!(
        session_id = %session.id(),
        exchanges = session.exchanges(),
        failures = session.failures(),
        "chat session ended"
    );
    Ok(())
}

/// Banner for `session`, or nothing in quiet mode.
fn session_banner<G: TextGenerator>(session: &ChatSession<G>, quiet: bool) -> Option<String> {
    if quiet {
        return None;
    }
    Some(welcome_banner(
        session.generator().name(),
        session.generator().model(),
        &session.format().to_string(),
        session.buffer().window_size(),
        &session.id().to_string(),
    ))
}

/// Handle one line of user input.
///
/// Empty lines are ignored, slash commands run locally, anything else is a
/// chat turn.
pub async fn handle_line<G: TextGenerator>(session: &mut ChatSession<G>, line: &str) -> LoopControl {
    let text = line.trim();
    if text.is_empty() {
        return LoopControl::Continue;
    }

    if let Some(cmd) = commands::parse(text) {
        return run_command(session, cmd);
    }

    let spinner = thinking_spinner();
    let result = session.respond(text).await;
    spinner.finish_and_clear();

    match result {
        Ok(reply) => {
            println!("\n  {} {}", style("Bot >").cyan().bold(), reply.text);
            tracing::debug!(elapsed_ms = reply.elapsed.as_millis() as u64, "reply printed");
            println!();
        }
        Err(e) => {
            eprintln!(
                "\n  {} Sorry, I encountered an error generating a response.",
                style("!").red().bold()
            );
            eprintln!("  {}", style(&e).dim());
            eprintln!("  {}\n", style("Type a message to retry, /exit to quit.").dim());
        }
    }
    LoopControl::Continue
}

fn run_command<G: TextGenerator>(session: &mut ChatSession<G>, cmd: ChatCommand) -> LoopControl {
    match cmd {
        ChatCommand::Help => commands::print_help(),
        ChatCommand::Clear => {
            session.clear();
            println!("\n  {} Conversation memory cleared.\n", style("✓").green().bold());
        }
        ChatCommand::Info => print_info(&SessionInfo {
            stats: session.stats(),
            session_id: session.id().to_string(),
            backend: session.generator().name(),
            model: session.generator().model(),
            params: session.params(),
            started_at: session.started_at(),
            exchanges: session.exchanges(),
            failures: session.failures(),
        }),
        ChatCommand::Exit => {
            print_goodbye();
            return LoopControl::Exit;
        }
        ChatCommand::Unknown(name) => {
            println!(
                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                style("?").yellow().bold(),
                style(name).dim()
            );
        }
    }
    LoopControl::Continue
}

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

fn print_goodbye() {
    println!("\n  {}", style("Session ended. Thanks for chatting!").dim());
}
