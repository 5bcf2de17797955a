//! Command execution.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use convo_detect::StateDecisionEngine;
use convo_llm::{ApiChatClient, ApiChatConfig, LlmClient, OllamaClient, OllamaConfig};
use convo_types::Settings;

use crate::cli::Cli;
use crate::{output, session};

/// Run a detection according to the parsed CLI arguments.
pub async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    // CLI overrides take highest precedence.
    if let Some(log_level) = cli.log_level.as_deref() {
        settings.log_level = log_level.to_string();
    }
    if cli.arbitrate {
        settings.detector.arbitration.enabled = true;
    }

    init_logging(&settings.log_level)?;

    settings
        .detector
        .similarity
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid similarity configuration")?;

    let history = session::load_history(Path::new(&cli.session_file), cli.last_n)?;
    info!("Reading session history: {} messages", history.len());

    let user_input = match cli.user_input {
        Some(input) => input,
        None => prompt_for_input()?,
    };

    let engine = build_engine(&settings)?;
    let result = engine.detect(&user_input, &history).await;

    println!("{}", output::render(&result, cli.format)?);

    Ok(())
}

/// Wire the engine from settings, degrading gracefully when the
/// arbitration endpoint is enabled but unusable.
fn build_engine(settings: &Settings) -> Result<StateDecisionEngine> {
    let local: Arc<dyn LlmClient> = Arc::new(
        OllamaClient::new(OllamaConfig::from(&settings.service))
            .context("Failed to build local model client")?,
    );

    if settings.detector.arbitration.enabled {
        match ApiChatConfig::from_settings(&settings.arbitration_api) {
            Ok(config) => {
                let arbiter: Arc<dyn LlmClient> = Arc::new(
                    ApiChatClient::new(config).context("Failed to build arbitration client")?,
                );
                return Ok(StateDecisionEngine::with_arbitration(
                    local,
                    arbiter,
                    settings.detector.clone(),
                ));
            }
            Err(e) => {
                warn!(error = %e, "Arbitration enabled but unusable, continuing without it");
            }
        }
    }

    Ok(StateDecisionEngine::new(local, settings.detector.clone()))
}

fn prompt_for_input() -> Result<String> {
    print!("Enter your message: ");
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read user input")?;

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    Ok(())
}
