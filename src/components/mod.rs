use crate::error::AgendaResult;
use crate::scheduling::EventRequest;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use std::sync::Arc;

pub mod gmail;
pub mod google_auth;
pub mod google_calendar;
pub mod notifier;
pub mod provider;
pub mod token_store;

use gmail::RawMessage;
use google_calendar::CalendarEntry;

/// Read side of a mailbox
pub trait MailboxReader: Send + Sync {
    /// Messages matching `query`, at most `max_results`, fetched lazily page by page
    fn search<'a>(&'a self, query: &'a str, max_results: usize) -> BoxStream<'a, AgendaResult<RawMessage>>;
}

/// Lists entries of a calendar
#[async_trait]
pub trait CalendarReader: Send + Sync {
    /// Entries starting inside `[start, end)`, ordered by start
    async fn list_window(
        &self,
        calendar_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AgendaResult<Vec<CalendarEntry>>;
}

/// Inserts entries into a calendar
#[async_trait]
pub trait CalendarWriter: Send + Sync {
    async fn insert(&self, calendar_id: &str, request: &EventRequest) -> AgendaResult<CalendarEntry>;
}

/// A calendar that can be both read and written
pub trait CalendarService: CalendarReader + CalendarWriter {}

impl<T: CalendarReader + CalendarWriter> CalendarService for T {}

/// Authenticated clients for one workflow run
#[derive(Clone)]
pub struct Services {
    pub mailbox: Arc<dyn MailboxReader>,
    pub calendar: Arc<dyn CalendarService>,
}

/// Hands out authenticated services
#[async_trait]
pub trait ServiceProvider: Send + Sync {
    /// Fails with an authentication error when no valid credential can be obtained
    async fn connect(&self) -> AgendaResult<Services>;
}
