//! Post-processing of raw generation output.
//!
//! Small causal models rarely stop cleanly: they echo the prompt, prefix the
//! reply with a speaker label, and keep writing the user's next line. The
//! cleaner reduces raw output to the first complete, label-free reply. It
//! never fails; when nothing usable survives it hands back the raw text.

use regex::Regex;

use parley_types::chat::PromptFormat;
use parley_types::config::CleaningConfig;
use parley_types::error::ConfigError;

/// Speaker labels models tend to hallucinate, matched case-insensitively.
const DEFAULT_LABELS: &[&str] = &["user", "you", "human", "bot", "assistant", "ai"];

/// Chat-template markers that always end a reply.
const TEMPLATE_MARKERS: &[&str] = &["<|", "</s>"];

const ASSISTANT_MARKER: &str = "<|assistant|>";

const ELLIPSIS: &str = "...";

/// Reduces raw engine output to a clean reply.
#[derive(Debug, Clone)]
pub struct ResponseCleaner {
    leading_label: Regex,
    line_boundary: Regex,
    inline_boundary: Regex,
    markers: Vec<String>,
    max_sentences: usize,
    max_chars: usize,
}

impl ResponseCleaner {
    pub fn new(config: &CleaningConfig, format: &PromptFormat) -> Result<Self, ConfigError> {
        let labels = DEFAULT_LABELS
            .iter()
            .map(|l| regex::escape(l))
            .chain(
                config
                    .extra_labels
                    .iter()
                    .filter(|l| !l.trim().is_empty())
                    .map(|l| regex::escape(l.trim())),
            )
            .collect::<Vec<_>>()
            .join("|");

        let mut markers: Vec<String> = TEMPLATE_MARKERS.iter().map(|m| m.to_string()).collect();
        if let PromptFormat::Separator { token } = format {
            if !token.is_empty() && !markers.contains(token) {
                markers.push(token.clone());
            }
        }

        Ok(Self {
            leading_label: label_regex(&format!(r"(?i)^\s*(?:{labels})\s*:"))?,
            line_boundary: label_regex(&format!(r"(?im)^[ \t]*(?:{labels})[ \t]*:"))?,
            inline_boundary: label_regex(&format!(r"(?i)[.!?]\s+(?:{labels})\s*:"))?,
            markers,
            max_sentences: config.max_sentences,
            max_chars: config.max_chars,
        })
    }

    /// Clean `raw` output generated for `prompt`.
    ///
    /// Returns the shortest prefix forming a complete, label-free reply, or
    /// `raw` unchanged when no such reply can be found. Idempotent.
    pub fn clean(&self, raw: &str, prompt: &str) -> String {
        let mut text = raw;

        if !prompt.is_empty() {
            if let Some(rest) = text.strip_prefix(prompt) {
                text = rest;
            }
        }

        if let Some(idx) = text.rfind(ASSISTANT_MARKER) {
            text = &text[idx + ASSISTANT_MARKER.len()..];
        }
        text = self.cut_at_markers(text);
        text = self.strip_leading_labels(text);
        text = self.cut_at_next_speaker(text);

        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let complete = drop_partial_sentence(&collapsed);
        let limited = self.limit_length(complete);

        if limited.is_empty() {
            tracing::debug!(raw_len = raw.len(), "no clean reply found, using raw output");
            return raw.to_string();
        }
        limited
    }

    fn cut_at_markers<'a>(&self, text: &'a str) -> &'a str {
        let end = self
            .markers
            .iter()
            .filter_map(|m| text.find(m.as_str()))
            .min()
            .unwrap_or(text.len());
        &text[..end]
    }

    fn strip_leading_labels<'a>(&self, mut text: &'a str) -> &'a str {
        while let Some(m) = self.leading_label.find(text) {
            text = &text[m.end()..];
        }
        text.trim_start()
    }

    fn cut_at_next_speaker<'a>(&self, text: &'a str) -> &'a str {
        let line = self
            .line_boundary
            .find_iter(text)
            .map(|m| m.start())
            .find(|&start| start > 0);
        // Keep the sentence punctuation that precedes an inline label.
        let inline = self.inline_boundary.find(text).map(|m| m.start() + 1);

        let end = match (line, inline) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => text.len(),
        };
        &text[..end]
    }

    fn limit_length(&self, text: &str) -> String {
        let mut text = text;
        if self.max_sentences > 0 {
            let ends = sentence_ends(text);
            if ends.len() > self.max_sentences {
                text = &text[..ends[self.max_sentences - 1]];
            }
        }

        if self.max_chars == 0 || text.chars().count() <= self.max_chars {
            return text.to_string();
        }
        if self.max_chars <= ELLIPSIS.len() {
            return text.chars().take(self.max_chars).collect();
        }

        let keep = self.max_chars - ELLIPSIS.len();
        let cut = text
            .char_indices()
            .nth(keep)
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        let head = &text[..cut];
        let head = match head.rfind(' ') {
            Some(space) if space > 0 => &head[..space],
            _ => head,
        };
        format!("{}{ELLIPSIS}", head.trim_end())
    }
}

fn label_regex(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidParameter {
        name: "extra_labels",
        reason: e.to_string(),
    })
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closer(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '\u{201d}' | '\u{2019}')
}

/// Byte offsets just past each sentence end.
///
/// A sentence ends at a run of `.`, `!` or `?` (plus closing quotes or
/// brackets) followed by whitespace or the end of text, so decimal points
/// and abbreviations inside words are skipped.
fn sentence_ends(text: &str) -> Vec<usize> {
    let mut ends = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if !is_terminator(c) {
            continue;
        }
        let mut end = text.len();
        while let Some(&(i, next)) = chars.peek() {
            if is_terminator(next) || is_closer(next) {
                chars.next();
                continue;
            }
            end = i;
            break;
        }
        let at_boundary = end == text.len() || text[end..].starts_with(char::is_whitespace);
        if at_boundary {
            ends.push(end);
        }
    }
    ends
}

/// Drop an unfinished trailing sentence when a finished one precedes it.
fn drop_partial_sentence(text: &str) -> &str {
    match sentence_ends(text).last() {
        Some(&end) => text[..end].trim_end(),
        None => text,
    }
}
