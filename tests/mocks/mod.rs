//! In-memory collaborators for driving the orchestrator without Google or Twilio
#![allow(dead_code)]

use agendabot::components::gmail::RawMessage;
use agendabot::components::google_calendar::CalendarEntry;
use agendabot::components::notifier::{DeliveryReceipt, Notifier};
use agendabot::components::{CalendarReader, CalendarWriter, MailboxReader, ServiceProvider, Services};
use agendabot::config::Config;
use agendabot::error::{auth_error, gmail_error, google_calendar_error, notification_error, AgendaResult};
use agendabot::scheduling::EventRequest;
use agendabot::workflow::WorkflowOrchestrator;
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use futures::stream::{self, BoxStream, StreamExt};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Monday 2026-10-19 10:00 UTC
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap()
}

/// A single-part plain text message as Gmail returns it
pub fn raw_message(id: &str, subject: &str, body: &str) -> RawMessage {
    serde_json::from_value(json!({
        "id": id,
        "payload": {
            "mimeType": "text/plain",
            "headers": [
                { "name": "From", "value": "alice@example.com" },
                { "name": "Subject", "value": subject }
            ],
            "body": { "size": body.len(), "data": URL_SAFE_NO_PAD.encode(body) }
        }
    }))
    .unwrap()
}

/// Mailbox yielding a fixed list of messages or per-item errors
#[derive(Default)]
pub struct MockMailbox {
    items: Vec<Result<RawMessage, String>>,
    pub last_query: std::sync::Mutex<Option<(String, usize)>>,
}

impl MockMailbox {
    pub fn new(items: Vec<Result<RawMessage, String>>) -> Self {
        Self {
            items,
            last_query: std::sync::Mutex::new(None),
        }
    }
}

impl MailboxReader for MockMailbox {
    fn search<'a>(&'a self, query: &'a str, max_results: usize) -> BoxStream<'a, AgendaResult<RawMessage>> {
        *self.last_query.lock().unwrap() = Some((query.to_string(), max_results));
        let items: Vec<AgendaResult<RawMessage>> = self
            .items
            .iter()
            .take(max_results)
            .map(|item| item.clone().map_err(|e| gmail_error(&e)))
            .collect();
        stream::iter(items).boxed()
    }
}

/// Calendar recording inserts and serving a fixed day
#[derive(Default)]
pub struct MockCalendar {
    pub entries: Vec<CalendarEntry>,
    pub failing_summaries: Vec<String>,
    pub fail_listing: bool,
    pub inserted: Mutex<Vec<EventRequest>>,
    pub list_calls: AtomicUsize,
}

impl MockCalendar {
    pub fn with_entries(entries: Vec<CalendarEntry>) -> Self {
        Self {
            entries,
            ..Default::default()
        }
    }
}

#[async_trait]
impl CalendarWriter for MockCalendar {
    async fn insert(&self, _calendar_id: &str, request: &EventRequest) -> AgendaResult<CalendarEntry> {
        if self.failing_summaries.contains(&request.summary) {
            return Err(google_calendar_error("HTTP 500 - backend error"));
        }
        let mut inserted = self.inserted.lock().await;
        inserted.push(request.clone());
        Ok(CalendarEntry {
            id: format!("evt{}", inserted.len()),
            summary: Some(request.summary.clone()),
            start_date_time: Some(request.start.to_rfc3339()),
            end_date_time: Some(request.end.to_rfc3339()),
            ..Default::default()
        })
    }
}

#[async_trait]
impl CalendarReader for MockCalendar {
    async fn list_window(
        &self,
        _calendar_id: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> AgendaResult<Vec<CalendarEntry>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing {
            return Err(google_calendar_error("HTTP 503 - unavailable"));
        }
        Ok(self.entries.clone())
    }
}

/// Provider handing out the same mocks on every connect
pub struct MockProvider {
    pub mailbox: Arc<MockMailbox>,
    pub calendar: Arc<MockCalendar>,
    pub fail_auth: bool,
    pub connects: AtomicUsize,
}

impl MockProvider {
    pub fn new(mailbox: MockMailbox, calendar: MockCalendar) -> Self {
        Self {
            mailbox: Arc::new(mailbox),
            calendar: Arc::new(calendar),
            fail_auth: false,
            connects: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_auth: true,
            ..Self::new(MockMailbox::default(), MockCalendar::default())
        }
    }
}

#[async_trait]
impl ServiceProvider for MockProvider {
    async fn connect(&self) -> AgendaResult<Services> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail_auth {
            return Err(auth_error("No stored token found"));
        }
        Ok(Services {
            mailbox: self.mailbox.clone(),
            calendar: self.calendar.clone(),
        })
    }
}

/// Notifier recording what it was asked to send
#[derive(Default)]
pub struct MockNotifier {
    pub fail: bool,
    pub sent: Mutex<Vec<String>>,
}

impl MockNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, text: &str) -> AgendaResult<DeliveryReceipt> {
        self.sent.lock().await.push(text.to_string());
        if self.fail {
            return Err(notification_error("HTTP 401 - bad credentials"));
        }
        Ok(DeliveryReceipt {
            id: Some("SM123".to_string()),
        })
    }
}

pub fn test_config() -> Config {
    Config {
        timezone: "UTC".to_string(),
        ..Default::default()
    }
}

pub fn orchestrator(
    config: Config,
    provider: Arc<MockProvider>,
    notifier: Arc<MockNotifier>,
) -> WorkflowOrchestrator {
    WorkflowOrchestrator::new(Arc::new(config), provider, notifier).unwrap()
}
