//! Careterm - terminal client for the care portal
//!
//! Main entry point for the Careterm application.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use careterm::cli::{Cli, Commands};
use careterm::commands;
use careterm::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse_args();

    let config_path = cli.config.clone().unwrap_or_else(|| "config/config.yaml".to_string());
    let config = Config::load(&config_path, &cli)?;
    config.validate()?;

    match cli.command {
        Commands::Chat {
            session,
            personal_context,
        } => {
            tracing::info!("Starting interactive chat");
            commands::chat::run_chat(config, session, personal_context).await?;
        }
        Commands::Watch { interval } => {
            tracing::info!("Starting notification watch");
            commands::watch::run_watch(config, interval).await?;
        }
        Commands::CheckLogin => {
            commands::forms::run_check_login()?;
        }
        Commands::CheckRegistration => {
            commands::forms::run_check_registration()?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("careterm=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
