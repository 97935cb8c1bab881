use anyhow::{anyhow, Result};
use clap::Args;
use std::io::{self, Read};
use tracing::{debug, info};

use crate::client::ChatClient;
use crate::config::Config;

/// Send a single message non-interactively
#[derive(Args)]
pub struct SendCommand {
    /// The message to send. If not provided, will read from stdin
    pub message: Vec<String>,

    /// Continue an existing session
    #[arg(short = 's', long = "session")]
    pub session: Option<String>,

    /// Only print the reply, without the session id
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

impl SendCommand {
    pub async fn execute(&self, config: &Config) -> Result<()> {
        debug!("Executing send command");

        // Get the message either from arguments or stdin
        let message = self.get_message()?;

        if message.trim().is_empty() {
            return Err(anyhow!("No message provided. Use arguments or pipe input via stdin."));
        }

        info!("Sending message: {}", message.chars().take(50).collect::<String>());

        // Validate the configuration
        config.validate()?;

        let client = ChatClient::new(config.base_url.clone());
        let reply = client.send_message(message.trim(), self.session.clone()).await?;

        // The reply goes to stdout, the session id to stderr so the
        // output stays pipeable
        println!("{}", reply.response);
        if !self.quiet {
            eprintln!("session: {}", reply.session_id);
        }

        Ok(())
    }

    fn get_message(&self) -> Result<String> {
        if !self.message.is_empty() {
            // Join all arguments into a single message
            Ok(self.message.join(" "))
        } else {
            // Read from stdin
            debug!("Reading message from stdin");
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)
                .map_err(|e| anyhow!("Failed to read from stdin: {}", e))?;
            Ok(buffer)
        }
    }
}
