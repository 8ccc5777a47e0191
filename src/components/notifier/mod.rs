mod discord;
mod whatsapp;

pub use discord::DiscordWebhookNotifier;
pub use whatsapp::{WhatsAppNotifier, TWILIO_API_BASE};

use crate::config::{Config, NotifierKind};
use crate::error::{notification_error, AgendaResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Confirmation returned by the messaging service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Provider message id, when the provider returns one
    pub id: Option<String>,
}

/// Delivers a text message to the user
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> AgendaResult<DeliveryReceipt>;
}

/// Stands in for a notifier whose settings are incomplete
#[derive(Debug, Clone)]
pub struct UnconfiguredNotifier {
    missing: Vec<&'static str>,
}

impl UnconfiguredNotifier {
    pub fn new(missing: Vec<&'static str>) -> Self {
        Self { missing }
    }
}

#[async_trait]
impl Notifier for UnconfiguredNotifier {
    async fn send(&self, _text: &str) -> AgendaResult<DeliveryReceipt> {
        Err(notification_error(&format!(
            "Missing notifier settings: {}",
            self.missing.join(", ")
        )))
    }
}

/// Pick the notifier named by the configuration
pub fn from_config(config: &Config, client: Client) -> Arc<dyn Notifier> {
    match config.notifier {
        NotifierKind::Whatsapp => {
            let missing = config.missing_whatsapp_settings();
            match (
                &config.twilio_account_sid,
                &config.twilio_auth_token,
                &config.whatsapp_from,
                &config.whatsapp_to,
            ) {
                (Some(sid), Some(token), Some(from), Some(to)) if missing.is_empty() => Arc::new(
                    WhatsAppNotifier::new(client, sid.clone(), token.clone(), from.clone(), to.clone()),
                ),
                _ => Arc::new(UnconfiguredNotifier::new(missing)),
            }
        }
        NotifierKind::Discord => match config.discord_webhook_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Arc::new(DiscordWebhookNotifier::new(client, url)),
            _ => Arc::new(UnconfiguredNotifier::new(vec!["DISCORD_WEBHOOK_URL"])),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[tokio::test]
    async fn test_missing_whatsapp_settings_fail_at_send() {
        let config = Config {
            twilio_account_sid: Some("AC123".to_string()),
            ..Default::default()
        };
        let notifier = from_config(&config, Client::new());

        match notifier.send("hello").await {
            Err(Error::Notification(message)) => {
                assert!(message.contains("TWILIO_AUTH_TOKEN"));
                assert!(message.contains("WHATSAPP_TO"));
                assert!(!message.contains("TWILIO_ACCOUNT_SID"));
            }
            other => panic!("expected notification error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_discord_webhook() {
        let config = Config {
            notifier: NotifierKind::Discord,
            ..Default::default()
        };
        let notifier = from_config(&config, Client::new());
        assert!(matches!(notifier.send("hello").await, Err(Error::Notification(_))));
    }
}
