use super::models::{ListMessagesResponse, RawMessage};
use crate::components::MailboxReader;
use crate::error::{gmail_error, AgendaResult};
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::Client;
use std::collections::VecDeque;
use tracing::debug;

pub const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";

/// Largest page the list endpoint accepts
const MAX_PAGE_SIZE: usize = 100;

/// Reads messages from the authenticated user's mailbox
#[derive(Clone)]
pub struct GmailClient {
    client: Client,
    base_url: String,
    access_token: String,
}

struct SearchState {
    pending: VecDeque<String>,
    page_token: Option<String>,
    listed: usize,
    exhausted: bool,
}

impl GmailClient {
    pub fn new(client: Client, access_token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: GMAIL_API_BASE.to_string(),
            access_token: access_token.into(),
        }
    }

    /// Point the client at another API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetch one page of message ids matching `query`
    pub async fn list_page(
        &self,
        query: &str,
        page_size: usize,
        page_token: Option<&str>,
    ) -> AgendaResult<ListMessagesResponse> {
        let url = format!("{}/users/me/messages", self.base_url);
        let mut params = vec![("q", query.to_string()), ("maxResults", page_size.to_string())];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&params)
            .send()
            .await
            .map_err(|e| gmail_error(&format!("Failed to list messages: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(gmail_error(&format!(
                "Failed to list messages: HTTP {} - {}",
                status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| gmail_error(&format!("Failed to parse message list: {}", e)))
    }

    /// Fetch a full message by id
    pub async fn get_message(&self, id: &str) -> AgendaResult<RawMessage> {
        let url = format!("{}/users/me/messages/{}", self.base_url, id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[("format", "full")])
            .send()
            .await
            .map_err(|e| gmail_error(&format!("Failed to fetch message {}: {}", id, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(gmail_error(&format!(
                "Failed to fetch message {}: HTTP {} - {}",
                id, status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| gmail_error(&format!("Failed to parse message {}: {}", id, e)))
    }
}

impl MailboxReader for GmailClient {
    fn search<'a>(&'a self, query: &'a str, max_results: usize) -> BoxStream<'a, AgendaResult<RawMessage>> {
        let state = SearchState {
            pending: VecDeque::new(),
            page_token: None,
            listed: 0,
            exhausted: false,
        };

        stream::unfold(state, move |mut state| async move {
            loop {
                if let Some(id) = state.pending.pop_front() {
                    let message = self.get_message(&id).await;
                    return Some((message, state));
                }
                if state.exhausted || state.listed >= max_results {
                    return None;
                }

                let remaining = max_results - state.listed;
                let page_size = remaining.min(MAX_PAGE_SIZE);
                match self.list_page(query, page_size, state.page_token.as_deref()).await {
                    Ok(page) => {
                        let ids: Vec<String> = page
                            .messages
                            .unwrap_or_default()
                            .into_iter()
                            .map(|m| m.id)
                            .take(remaining)
                            .collect();
                        debug!("Listed {} message ids", ids.len());
                        state.listed += ids.len();
                        state.exhausted = ids.is_empty() || page.next_page_token.is_none();
                        state.page_token = page.next_page_token;
                        state.pending.extend(ids);
                    }
                    Err(e) => {
                        state.exhausted = true;
                        return Some((Err(e), state));
                    }
                }
            }
        })
        .boxed()
    }
}
