use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use super::end_session::EndSessionCommand;
use super::send::SendCommand;
use crate::config::Config;
use crate::tui;

/// Solace - A pocket support chat for your terminal
#[derive(Parser)]
#[command(
    name = "solace",
    version,
    about = "A pocket support chat for your terminal",
    long_about = r#"Solace puts a small support-chat popup in the corner of your terminal.
Open the popup, type a message, and the configured chat service answers in place.

Examples:
  solace                          # Start the interactive popup
  solace send "hello there"       # Send a single message
  solace end-session abc123       # End a session on the server"#
)]
pub struct Cli {
    /// Base URL of the chat service
    #[arg(short = 'u', long = "base-url", global = true)]
    pub base_url: Option<String>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a single message non-interactively
    Send(SendCommand),

    /// End a chat session on the server
    EndSession(EndSessionCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        if self.debug {
            debug!("Debug logging enabled");
        }

        // Initialize configuration
        let config = Config::init().await?.with_base_url(self.base_url.clone());
        debug!("Configuration initialized");

        match self.command {
            Some(Commands::Send(send_cmd)) => send_cmd.execute(&config).await,
            Some(Commands::EndSession(end_cmd)) => end_cmd.execute(&config).await,
            None => self.start_interactive_mode(&config).await,
        }
    }

    async fn start_interactive_mode(&self, config: &Config) -> Result<()> {
        info!("Starting interactive mode");

        // Validate the configuration
        config.validate()?;

        tui::run(config).await?;

        info!("Application finished");
        Ok(())
    }
}
