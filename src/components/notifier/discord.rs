use super::{DeliveryReceipt, Notifier};
use crate::error::{notification_error, AgendaResult};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::info;

/// Posts the message to a Discord channel webhook
#[derive(Clone)]
pub struct DiscordWebhookNotifier {
    client: Client,
    webhook_url: String,
}

impl DiscordWebhookNotifier {
    pub fn new(client: Client, webhook_url: impl Into<String>) -> Self {
        Self {
            client,
            webhook_url: webhook_url.into(),
        }
    }
}

#[async_trait]
impl Notifier for DiscordWebhookNotifier {
    async fn send(&self, text: &str) -> AgendaResult<DeliveryReceipt> {
        let response = self
            .client
            .post(&self.webhook_url)
            .query(&[("wait", "true")])
            .json(&json!({ "content": text }))
            .send()
            .await
            .map_err(|e| notification_error(&format!("Failed to post to Discord: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(notification_error(&format!(
                "Discord rejected the message: HTTP {} - {}",
                status, error_body
            )));
        }

        let body: serde_json::Value = response.json().await.unwrap_or_default();
        let id = body.get("id").and_then(|id| id.as_str()).map(str::to_string);

        info!(id = ?id, "Discord message sent");
        Ok(DeliveryReceipt { id })
    }
}
