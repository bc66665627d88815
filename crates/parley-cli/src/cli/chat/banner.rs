//! Welcome banner display for chat sessions.

use std::fmt::Write;

use console::style;

/// Render the welcome banner shown at the start of a chat session.
pub fn welcome_banner(
    backend: &str,
    model: &str,
    format: &str,
    window_size: usize,
    session_id: &str,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "  {}", style("Parley").cyan().bold());
    let _ = writeln!(
        out,
        "  {}",
        style("A small-model chat with sliding-window memory").dim()
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "  {}    {}", style("Model:").bold(), style(model).dim());
    let _ = writeln!(out, "  {}  {}", style("Backend:").bold(), style(backend).dim());
    let _ = writeln!(out, "  {}   {}", style("Format:").bold(), style(format).dim());
    let _ = writeln!(
        out,
        "  {}   {}",
        style("Memory:").bold(),
        style(format!("{window_size} exchanges")).dim()
    );
    let _ = writeln!(
        out,
        "  {}  {}",
        style("Session:").bold(),
        style(&session_id[..8.min(session_id.len())]).dim()
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "  {}", style("Type /help for commands, Ctrl+D to exit").dim());
    let _ = writeln!(out, "  {}", style("---").dim());
    out
}
