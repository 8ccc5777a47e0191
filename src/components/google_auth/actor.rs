use crate::components::token_store::{StoredToken, TokenStore};
use crate::error::{auth_error, AgendaResult};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Google OAuth client settings used for refreshing
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
}

/// Commands that can be sent to the token actor
pub enum TokenCommand {
    GetAccessToken(mpsc::Sender<AgendaResult<String>>),
    Shutdown,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

/// Owns the current token; requests are handled one at a time so refreshes never overlap
pub struct TokenActor {
    store: Arc<dyn TokenStore>,
    client: Client,
    credentials: OAuthCredentials,
    cached: Option<StoredToken>,
    command_rx: mpsc::Receiver<TokenCommand>,
}

impl TokenActor {
    pub fn new(
        store: Arc<dyn TokenStore>,
        client: Client,
        credentials: OAuthCredentials,
        command_rx: mpsc::Receiver<TokenCommand>,
    ) -> Self {
        Self {
            store,
            client,
            credentials,
            cached: None,
            command_rx,
        }
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Token actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                TokenCommand::GetAccessToken(response_tx) => {
                    let result = self.access_token().await;
                    let _ = response_tx.send(result).await;
                }
                TokenCommand::Shutdown => {
                    info!("Token actor shutting down");
                    break;
                }
            }
        }

        info!("Token actor shut down");
    }

    async fn access_token(&mut self) -> AgendaResult<String> {
        let token = match self.cached.take() {
            Some(token) => token,
            None => self
                .store
                .load()
                .await
                .map_err(|e| auth_error(&format!("Could not load stored token: {}", e)))?
                .ok_or_else(|| auth_error("No stored token found"))?,
        };

        let token = if token.is_expired_at(Utc::now()) {
            debug!("Access token expired, refreshing");
            self.refresh(token).await?
        } else {
            token
        };

        let access_token = token.access_token.clone();
        self.cached = Some(token);
        Ok(access_token)
    }

    async fn refresh(&self, token: StoredToken) -> AgendaResult<StoredToken> {
        let refresh_token = token
            .refresh_token
            .clone()
            .ok_or_else(|| auth_error("Token expired and no refresh token is stored"))?;

        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(&self.credentials.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| auth_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(auth_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let refreshed: RefreshResponse = response
            .json()
            .await
            .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))?;

        let new_token = StoredToken {
            access_token: refreshed.access_token,
            refresh_token: refreshed.refresh_token.or(Some(refresh_token)),
            expires_at: Utc::now().timestamp() + refreshed.expires_in.unwrap_or(3600),
            scope: refreshed.scope.or(token.scope),
        };

        if let Err(e) = self.store.save(&new_token).await {
            warn!("Refreshed token could not be saved: {}", e);
        } else {
            info!("Access token refreshed");
        }

        Ok(new_token)
    }
}
