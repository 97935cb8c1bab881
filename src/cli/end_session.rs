use anyhow::Result;
use clap::Args;
use tracing::debug;

use crate::client::ChatClient;
use crate::config::Config;

/// End a chat session on the server
#[derive(Args)]
pub struct EndSessionCommand {
    /// Identifier of the session to end
    pub session_id: String,
}

impl EndSessionCommand {
    pub async fn execute(&self, config: &Config) -> Result<()> {
        debug!("Ending session {}", self.session_id);

        config.validate()?;

        let client = ChatClient::new(config.base_url.clone());
        let reply = client.end_session(&self.session_id).await?;

        println!("{}", reply.message);

        Ok(())
    }
}
