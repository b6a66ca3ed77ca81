//! SAO Chat - terminal client for the SAO chatbot
//!
#![doc = "SAO Chat - terminal client for the SAO chatbot"]
#![doc = "Main entry point for the sao-chat application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sao_chat::cli::{Cli, Commands};
use sao_chat::commands;
use sao_chat::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = Config::resolve_path(cli.config.as_deref());
    let config = Config::load(&config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { session } => {
            if let Some(s) = &session {
                tracing::debug!("Opening session: {}", s);
            }
            commands::chat::run_chat(config, session).await?;
            Ok(())
        }
        Commands::Sessions { command } => {
            tracing::info!("Starting session command");
            commands::sessions::handle_sessions(&config, command).await?;
            Ok(())
        }
        Commands::History { id, json } => {
            tracing::info!("Starting history command");
            commands::history::handle_history(&config, &id, json).await?;
            Ok(())
        }
        Commands::Send { message, session } => {
            commands::send::run_send(&config, &message, session).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so chat output on stdout stays clean.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "sao_chat=debug"
    } else {
        "sao_chat=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
