//! `/info` output: memory occupancy plus session metadata.

use chrono::{DateTime, Utc};
use console::style;

use parley_types::chat::BufferStats;
use parley_types::llm::GenerationParams;

/// Everything `/info` prints, gathered so it can be formatted in one place.
#[derive(Debug)]
pub struct SessionInfo<'a> {
    pub stats: BufferStats,
    pub session_id: String,
    pub backend: &'a str,
    pub model: &'a str,
    pub params: &'a GenerationParams,
    pub started_at: DateTime<Utc>,
    pub exchanges: u64,
    pub failures: u64,
}

pub fn print_info(info: &SessionInfo<'_>) {
    let stats = &info.stats;
    let uptime = Utc::now().signed_duration_since(info.started_at);

    println!();
    println!("  {}", style("Conversation memory").bold());
    println!("    Messages:    {}", stats.message_count);
    println!("    User:        {}", stats.user_messages);
    println!("    Assistant:   {}", stats.assistant_messages);
    println!("    Turns:       {}", stats.turn_count);
    println!("    Capacity:    {} messages", stats.capacity);
    println!("    Usage:       {:.1}%", stats.usage_percent());
    println!();
    println!("  {}", style("Session").bold());
    println!("    Id:          {}", style(&info.session_id).dim());
    println!("    Backend:     {} ({})", info.backend, info.model);
    println!("    Sampling:    {}", describe_sampling(info.params));
    println!("    Uptime:      {}", format_uptime(uptime.num_seconds()));
    println!(
        "    Replies:     {} ok, {} failed",
        info.exchanges, info.failures
    );
    println!();
}

fn describe_sampling(params: &GenerationParams) -> String {
    if !params.sample {
        return format!("greedy, max {} tokens", params.max_new_tokens);
    }
    let mut text = format!(
        "temperature {}, top_p {}",
        params.temperature, params.top_p
    );
    if let Some(k) = params.top_k {
        text.push_str(&format!(", top_k {k}"));
    }
    text.push_str(&format!(", max {} tokens", params.max_new_tokens));
    text
}

fn format_uptime(secs: i64) -> String {
    let secs = secs.max(0);
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}h {m:02}m {s:02}s")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}
