//! Command-line interface definition for Careterm
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, notification watching,
//! and offline credential pre-checks.

use clap::{Parser, Subcommand};

/// Careterm - terminal client for the care portal
///
/// Talk to the portal's assistant, watch for notifications, and
/// pre-check login/registration input before submitting it.
#[derive(Parser, Debug, Clone)]
#[command(name = "careterm")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Override the portal base URL from config
    #[arg(long, env = "CARETERM_SERVER")]
    pub server: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Careterm
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat with the assistant
    Chat {
        /// Open an existing session by id instead of starting empty
        #[arg(short, long)]
        session: Option<String>,

        /// Start with the personal-context toggle enabled
        #[arg(short = 'p', long)]
        personal_context: bool,
    },

    /// Watch for unread notifications and render them as toasts
    Watch {
        /// Override the poll interval in seconds
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Pre-check login credentials against the portal's form rules
    CheckLogin,

    /// Pre-check registration input against the portal's form rules
    CheckRegistration,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_command() {
        let cli = Cli::parse_from(["careterm", "chat", "--personal-context"]);
        match cli.command {
            Commands::Chat {
                personal_context,
                session,
            } => {
                assert!(personal_context);
                assert!(session.is_none());
            }
            _ => panic!("expected chat command"),
        }
    }

    #[test]
    fn test_parse_watch_with_interval() {
        let cli = Cli::parse_from(["careterm", "watch", "--interval", "5"]);
        match cli.command {
            Commands::Watch { interval } => assert_eq!(interval, Some(5)),
            _ => panic!("expected watch command"),
        }
    }

    #[test]
    fn test_server_override_flag() {
        let cli = Cli::parse_from(["careterm", "--server", "http://127.0.0.1:9000", "watch"]);
        assert_eq!(cli.server.as_deref(), Some("http://127.0.0.1:9000"));
    }
}
