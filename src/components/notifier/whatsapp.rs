use super::{DeliveryReceipt, Notifier};
use crate::error::{notification_error, AgendaResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

pub const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: Option<String>,
}

/// Sends WhatsApp messages through the Twilio Messages API
#[derive(Clone)]
pub struct WhatsAppNotifier {
    client: Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    from: String,
    to: String,
}

impl WhatsAppNotifier {
    pub fn new(client: Client, account_sid: String, auth_token: String, from: String, to: String) -> Self {
        Self {
            client,
            base_url: TWILIO_API_BASE.to_string(),
            account_sid,
            auth_token,
            from,
            to,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl Notifier for WhatsAppNotifier {
    async fn send(&self, text: &str) -> AgendaResult<DeliveryReceipt> {
        let url = format!("{}/Accounts/{}/Messages.json", self.base_url, self.account_sid);
        let params = [("From", self.from.as_str()), ("To", self.to.as_str()), ("Body", text)];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| notification_error(&format!("Failed to send WhatsApp message: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(notification_error(&format!(
                "Twilio rejected the message: HTTP {} - {}",
                status, error_body
            )));
        }

        let message: TwilioMessage = response
            .json()
            .await
            .map_err(|e| notification_error(&format!("Failed to parse Twilio response: {}", e)))?;

        info!(sid = ?message.sid, "WhatsApp message sent");
        Ok(DeliveryReceipt { id: message.sid })
    }
}
