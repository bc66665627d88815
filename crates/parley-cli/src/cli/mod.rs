//! CLI argument definitions for the `parley` binary.
//!
//! Uses clap derive macros. Running `parley` with no subcommand starts a
//! chat; every configuration override is a global flag so `parley config`
//! can show the effect of the same flags the chat would use.

pub mod chat;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

use parley_types::chat::{PromptFormat, DEFAULT_SEPARATOR_TOKEN};
use parley_types::config::{BackendKind, ParleyConfig};

/// Chat with a local language model from your terminal.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress status output (banner, connection notice); only errors and
    /// chat replies are printed.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Load configuration from this file instead of the data directory.
    #[arg(long, global = true, env = "PARLEY_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ConfigOverrides,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat session (default).
    Chat,

    /// Print the effective configuration.
    Config,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Standard,
    Separator,
    Zephyr,
}

/// Per-field overrides layered on top of `config.toml`.
#[derive(Debug, Default, Args)]
pub struct ConfigOverrides {
    /// Exchanges kept in conversation memory.
    #[arg(long, global = true, env = "PARLEY_WINDOW")]
    pub window: Option<usize>,

    /// Prompt format used to render history.
    #[arg(long, global = true, value_enum, env = "PARLEY_FORMAT")]
    pub format: Option<FormatArg>,

    /// Separator token (implies `--format separator`).
    #[arg(long, global = true, value_name = "TOKEN")]
    pub separator: Option<String>,

    /// Generation backend protocol (openai or ollama).
    #[arg(long, global = true, env = "PARLEY_BACKEND")]
    pub backend: Option<BackendKind>,

    /// Base URL of the inference server.
    #[arg(long, global = true, env = "PARLEY_BASE_URL")]
    pub base_url: Option<String>,

    /// Model name sent to the backend.
    #[arg(long, global = true, env = "PARLEY_MODEL")]
    pub model: Option<String>,

    /// System prompt (persona) placed before the history.
    #[arg(long, global = true)]
    pub system: Option<String>,

    #[arg(long, global = true)]
    pub max_new_tokens: Option<u32>,

    #[arg(long, global = true)]
    pub temperature: Option<f64>,

    #[arg(long, global = true)]
    pub top_p: Option<f64>,

    #[arg(long, global = true)]
    pub top_k: Option<u32>,

    #[arg(long, global = true)]
    pub repetition_penalty: Option<f64>,

    /// Disable sampling and decode greedily.
    #[arg(long, global = true)]
    pub greedy: bool,
}

impl ConfigOverrides {
    /// Apply every flag that was given to `config`.
    pub fn apply(&self, config: &mut ParleyConfig) {
        if let Some(window) = self.window {
            config.window_size = window;
        }

        match (self.format, &self.separator) {
            (Some(FormatArg::Standard), _) => config.format = PromptFormat::Standard,
            (Some(FormatArg::Zephyr), _) => config.format = PromptFormat::Zephyr,
            (Some(FormatArg::Separator), None) => {
                if !matches!(config.format, PromptFormat::Separator { .. }) {
                    config.format = PromptFormat::Separator {
                        token: DEFAULT_SEPARATOR_TOKEN.to_string(),
                    };
                }
            }
            (Some(FormatArg::Separator), Some(token)) | (None, Some(token)) => {
                config.format = PromptFormat::Separator {
                    token: token.clone(),
                };
            }
            (None, None) => {}
        }

        if let Some(kind) = self.backend {
            // Follow the backend's default port unless a URL was configured.
            if self.base_url.is_none() && config.backend.base_url == config.backend.kind.default_base_url() {
                config.backend.base_url = kind.default_base_url().to_string();
            }
            config.backend.kind = kind;
        }
        if let Some(url) = &self.base_url {
            config.backend.base_url = url.clone();
        }
        if let Some(model) = &self.model {
            config.backend.model = model.clone();
        }
        if let Some(system) = &self.system {
            config.system_prompt = system.clone();
        }

        let params = &mut config.generation;
        if let Some(n) = self.max_new_tokens {
            params.max_new_tokens = n;
        }
        if let Some(t) = self.temperature {
            params.temperature = t;
        }
        if let Some(p) = self.top_p {
            params.top_p = p;
        }
        if let Some(k) = self.top_k {
            params.top_k = Some(k);
        }
        if let Some(r) = self.repetition_penalty {
            params.repetition_penalty = r;
        }
        if self.greedy {
            params.sample = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_chat() {
        let cli = Cli::try_parse_from(["parley"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["parley", "config", "--json", "--window", "3"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config)));
        assert!(cli.json);
        assert_eq!(cli.overrides.window, Some(3));
    }

    #[test]
    fn test_no_flags_leave_config_untouched() {
        let mut config = ParleyConfig::default();
        ConfigOverrides::default().apply(&mut config);
        assert_eq!(config, ParleyConfig::default());
    }

    #[test]
    fn test_generation_overrides() {
        let overrides = ConfigOverrides {
            max_new_tokens: Some(40),
            temperature: Some(0.9),
            top_k: Some(10),
            greedy: true,
            ..Default::default()
        };
        let mut config = ParleyConfig::default();
        overrides.apply(&mut config);

        assert_eq!(config.generation.max_new_tokens, 40);
        assert_eq!(config.generation.temperature, 0.9);
        assert_eq!(config.generation.top_k, Some(10));
        assert!(!config.generation.sample);
    }

    #[test]
    fn test_separator_flag_implies_separator_format() {
        let overrides = ConfigOverrides {
            separator: Some("</s>".into()),
            ..Default::default()
        };
        let mut config = ParleyConfig::default();
        overrides.apply(&mut config);
        assert_eq!(config.format, PromptFormat::Separator { token: "</s>".into() });
    }

    #[test]
    fn test_format_separator_keeps_configured_token() {
        let overrides = ConfigOverrides {
            format: Some(FormatArg::Separator),
            ..Default::default()
        };
        let mut config = ParleyConfig {
            format: PromptFormat::Separator { token: "<eot>".into() },
            ..Default::default()
        };
        overrides.apply(&mut config);
        assert_eq!(config.format, PromptFormat::Separator { token: "<eot>".into() });
    }

    #[test]
    fn test_backend_switch_follows_default_url() {
        let overrides = ConfigOverrides {
            backend: Some(BackendKind::Ollama),
            ..Default::default()
        };
        let mut config = ParleyConfig::default();
        overrides.apply(&mut config);
        assert_eq!(config.backend.kind, BackendKind::Ollama);
        assert_eq!(config.backend.base_url, "http://127.0.0.1:11434");
    }

    #[test]
    fn test_backend_switch_keeps_custom_url() {
        let overrides = ConfigOverrides {
            backend: Some(BackendKind::Ollama),
            ..Default::default()
        };
        let mut config = ParleyConfig::default();
        config.backend.base_url = "http://gpu-box:11434".into();
        overrides.apply(&mut config);
        assert_eq!(config.backend.base_url, "http://gpu-box:11434");
    }
}
