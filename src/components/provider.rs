use super::gmail::GmailClient;
use super::google_auth::{OAuthCredentials, TokenHandle};
use super::google_calendar::GoogleCalendarClient;
use super::token_store::TokenStore;
use super::{ServiceProvider, Services};
use crate::config::Config;
use crate::error::{other_error, AgendaResult};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Build the HTTP client shared by every Google and notifier request
pub fn http_client(config: &Config) -> AgendaResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs.max(1)))
        .build()
        .map_err(|e| other_error(&format!("Failed to build HTTP client: {}", e)))
}

/// Connects Gmail and Google Calendar with a token from the token actor
#[derive(Clone)]
pub struct GoogleServiceProvider {
    client: Client,
    tokens: TokenHandle,
    gmail_base_url: Option<String>,
    calendar_base_url: Option<String>,
}

impl GoogleServiceProvider {
    pub fn new(client: Client, tokens: TokenHandle) -> Self {
        Self {
            client,
            tokens,
            gmail_base_url: None,
            calendar_base_url: None,
        }
    }

    /// Spawn a token actor over `store` and wrap it
    pub fn from_config(config: &Config, client: Client, store: Arc<dyn TokenStore>) -> Self {
        let credentials = OAuthCredentials {
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            token_url: config.google_token_url.clone(),
        };
        let tokens = TokenHandle::spawn(store, client.clone(), credentials);
        Self::new(client, tokens)
    }

    /// Override the API roots, used against local test servers
    pub fn with_base_urls(mut self, gmail: impl Into<String>, calendar: impl Into<String>) -> Self {
        self.gmail_base_url = Some(gmail.into());
        self.calendar_base_url = Some(calendar.into());
        self
    }

    pub fn tokens(&self) -> &TokenHandle {
        &self.tokens
    }
}

#[async_trait]
impl ServiceProvider for GoogleServiceProvider {
    async fn connect(&self) -> AgendaResult<Services> {
        let access_token = self.tokens.access_token().await?;
        debug!("Obtained Google access token");

        let mut gmail = GmailClient::new(self.client.clone(), access_token.clone());
        if let Some(base) = &self.gmail_base_url {
            gmail = gmail.with_base_url(base.clone());
        }

        let mut calendar = GoogleCalendarClient::new(self.client.clone(), access_token);
        if let Some(base) = &self.calendar_base_url {
            calendar = calendar.with_base_url(base.clone());
        }

        Ok(Services {
            mailbox: Arc::new(gmail),
            calendar: Arc::new(calendar),
        })
    }
}
