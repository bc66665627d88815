//! Parley command-line entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, layers configuration (defaults, `config.toml`,
//! flags), builds the generation backend, then dispatches to the chat loop
//! or one of the utility subcommands.

mod cli;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use clap_complete::generate;
use console::style;
use tracing_subscriber::EnvFilter;

use parley_core::chat::session::ChatSession;
use parley_core::llm::generator::TextGenerator;
use parley_infra::config::{load_config, load_config_file, read_api_key, resolve_data_dir};
use parley_infra::llm::build_generator;
use parley_types::config::ParleyConfig;

use cli::chat::startup::{check_backend, Readiness};
use cli::{Cli, Commands};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity; RUST_LOG wins when set.
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,parley=debug,parley_core=debug,parley_infra=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Shell completions don't need configuration
    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "parley", &mut std::io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let config = match effective_config(&cli).await {
        Ok(config) => config,
        Err(e) => return Ok(init_failure("Invalid configuration", &e)),
    };

    match cli.command {
        Some(Commands::Config) => {
            let rendered = if cli.json {
                serde_json::to_string_pretty(&config)?
            } else {
                toml::to_string_pretty(&config).context("failed to render configuration")?
            };
            println!("{rendered}");
        }

        None | Some(Commands::Chat) => {
            let api_key = read_api_key(&config.backend);
            let generator = match build_generator(&config.backend, api_key) {
                Ok(g) => g,
                Err(e) => return Ok(init_failure("Failed to create generation backend", &e.into())),
            };

            if !cli.quiet {
                println!(
                    "  {} Connecting to {} at {}...",
                    style("…").dim(),
                    style(generator.name()).cyan(),
                    config.backend.base_url
                );
            }
            match check_backend(&generator).await {
                Ok(Readiness::Ready) => {}
                Ok(Readiness::Degraded(e)) => {
                    eprintln!(
                        "  {} Startup check failed ({e}); replies may fail until the engine recovers.",
                        style("!").yellow().bold()
                    );
                }
                Err(e) => {
                    return Ok(init_failure(
                        &format!("Model '{}' is not available", config.backend.model),
                        &e.into(),
                    ));
                }
            }

            let session = ChatSession::new(&config, generator)?;
            cli::chat::loop_runner::run_chat_loop(session, cli.quiet).await?;
        }

        Some(Commands::Completions { .. }) => unreachable!("handled above"),
    }

    Ok(ExitCode::SUCCESS)
}

/// Defaults, then the config file, then flags; validated.
async fn effective_config(cli: &Cli) -> anyhow::Result<ParleyConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_file(path).await?,
        None => load_config(&resolve_data_dir()).await,
    };
    cli.overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

/// Report a startup failure and pick the process exit code.
fn init_failure(what: &str, err: &anyhow::Error) -> ExitCode {
    tracing::error!(error = %err, "{what}");
    eprintln!();
    eprintln!("  {} {what}: {err:#}", style("✗").red().bold());
    eprintln!();
    ExitCode::FAILURE
}
