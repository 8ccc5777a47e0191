use super::actor::{OAuthCredentials, TokenActor, TokenCommand};
use crate::components::token_store::TokenStore;
use crate::error::{auth_error, AgendaResult};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Handle for interacting with the token actor
#[derive(Clone)]
pub struct TokenHandle {
    command_tx: mpsc::Sender<TokenCommand>,
}

impl TokenHandle {
    /// Create the actor and spawn its processing loop
    pub fn spawn(store: Arc<dyn TokenStore>, client: Client, credentials: OAuthCredentials) -> Self {
        let (command_tx, command_rx) = mpsc::channel(32);
        let mut actor = TokenActor::new(store, client, credentials, command_rx);

        tokio::spawn(async move {
            actor.run().await;
        });

        Self { command_tx }
    }

    /// A currently valid access token, refreshed first when needed
    pub async fn access_token(&self) -> AgendaResult<String> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(TokenCommand::GetAccessToken(response_tx))
            .await
            .map_err(|e| auth_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| auth_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AgendaResult<()> {
        let _ = self.command_tx.send(TokenCommand::Shutdown).await;
        Ok(())
    }
}
