//! One end-to-end run: authenticate, read mail, create events, read today's
//! schedule and send the digest.

mod outcome;

pub use outcome::{ItemOutcome, WorkflowState, WorkflowSummary};

use crate::components::gmail::{decode_message, EmailMessage};
use crate::components::google_calendar::{
    CalendarEntry, ScheduleFormatter, TimeWindow, SCHEDULE_UNAVAILABLE,
};
use crate::components::notifier::Notifier;
use crate::components::{CalendarService, MailboxReader, ServiceProvider};
use crate::config::{Config, ConfigSummary};
use crate::error::{AgendaResult, Error};
use crate::scheduling::{BuildOutcome, EventRequestBuilder};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Sequences the collaborators for a workflow run
pub struct WorkflowOrchestrator {
    config: Arc<Config>,
    provider: Arc<dyn ServiceProvider>,
    notifier: Arc<dyn Notifier>,
    builder: EventRequestBuilder,
    formatter: ScheduleFormatter,
}

impl WorkflowOrchestrator {
    pub fn new(
        config: Arc<Config>,
        provider: Arc<dyn ServiceProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> AgendaResult<Self> {
        let builder = EventRequestBuilder::from_config(&config)?;
        let formatter = ScheduleFormatter::new(config.tz()?);
        Ok(Self {
            config,
            provider,
            notifier,
            builder,
            formatter,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole workflow once.
    ///
    /// Only an authentication failure is returned as an error; everything
    /// after that is isolated per item and reflected in the summary.
    pub async fn run_workflow(
        &self,
        query: Option<&str>,
        max_results: Option<usize>,
        send_notification: bool,
    ) -> AgendaResult<WorkflowSummary> {
        self.run_workflow_at(query, max_results, send_notification, Utc::now()).await
    }

    /// [`run_workflow`](Self::run_workflow) against a fixed "now"
    pub async fn run_workflow_at(
        &self,
        query: Option<&str>,
        max_results: Option<usize>,
        send_notification: bool,
        now: DateTime<Utc>,
    ) -> AgendaResult<WorkflowSummary> {
        let query = query.unwrap_or(self.config.gmail_query.as_str());
        let max_results = max_results.unwrap_or(self.config.gmail_max_results);

        enter(WorkflowState::Authenticating);
        let services = match self.provider.connect().await {
            Ok(services) => services,
            Err(e) => {
                enter(WorkflowState::Failed);
                error!("Authentication failed, aborting run: {}", e);
                return Err(e);
            }
        };

        enter(WorkflowState::FetchingEmails);
        let emails = collect_emails(services.mailbox.as_ref(), query, max_results).await;

        enter(WorkflowState::CreatingEvents);
        let outcomes = self.create_events(services.calendar.as_ref(), &emails, now).await;
        let mut summary = WorkflowSummary::tally(emails.len(), &outcomes);

        enter(WorkflowState::FetchingSchedule);
        summary.digest = self.digest_from(services.calendar.as_ref(), now).await;

        if send_notification {
            enter(WorkflowState::Notifying);
            match self.notifier.send(&summary.digest).await {
                Ok(receipt) => {
                    info!(id = ?receipt.id, "Digest delivered");
                    summary.notification_sent = true;
                }
                Err(e) => warn!("Failed to deliver digest: {}", e),
            }
        }

        enter(WorkflowState::Done);
        summary.state = WorkflowState::Done;
        info!(
            emails = summary.emails_processed,
            created = summary.events_created,
            skipped = summary.events_skipped,
            failed = summary.events_failed,
            "Workflow finished"
        );
        Ok(summary)
    }

    /// Decoded emails matching the query, without creating anything
    pub async fn fetch_emails(
        &self,
        query: Option<&str>,
        max_results: Option<usize>,
    ) -> AgendaResult<Vec<EmailMessage>> {
        let services = self.provider.connect().await?;
        let query = query.unwrap_or(self.config.gmail_query.as_str());
        let max_results = max_results.unwrap_or(self.config.gmail_max_results);

        let mut messages = services.mailbox.search(query, max_results);
        let mut emails = Vec::new();
        while let Some(raw) = messages.next().await {
            emails.push(decode_message(&raw?));
        }
        Ok(emails)
    }

    /// Read mail and build an event request for each message, without
    /// touching the calendar.
    pub async fn fetch_and_build_events(
        &self,
        query: Option<&str>,
        max_results: Option<usize>,
    ) -> AgendaResult<Vec<(EmailMessage, BuildOutcome)>> {
        self.fetch_and_build_events_at(query, max_results, Utc::now()).await
    }

    /// [`fetch_and_build_events`](Self::fetch_and_build_events) against a fixed "now"
    pub async fn fetch_and_build_events_at(
        &self,
        query: Option<&str>,
        max_results: Option<usize>,
        now: DateTime<Utc>,
    ) -> AgendaResult<Vec<(EmailMessage, BuildOutcome)>> {
        let services = self.provider.connect().await?;
        let query = query.unwrap_or(self.config.gmail_query.as_str());
        let max_results = max_results.unwrap_or(self.config.gmail_max_results);

        let emails = collect_emails(services.mailbox.as_ref(), query, max_results).await;
        Ok(emails
            .into_iter()
            .map(|email| {
                let outcome = self.builder.build_at(&email.subject, &email.body, now);
                (email, outcome)
            })
            .collect())
    }

    /// Digest for the rest of the current UTC day.
    ///
    /// A calendar read failure gives the placeholder digest; authentication
    /// failures are still returned.
    pub async fn get_today_digest(&self) -> AgendaResult<String> {
        let services = self.provider.connect().await?;
        Ok(self.digest_from(services.calendar.as_ref(), Utc::now()).await)
    }

    /// Create one event directly from a subject and description.
    ///
    /// `Ok(None)` means no date was found in the description.
    pub async fn create_event(
        &self,
        subject: &str,
        description: &str,
    ) -> AgendaResult<Option<CalendarEntry>> {
        if subject.trim().is_empty() {
            return Err(Error::InvalidInput("Subject must not be empty".to_string()));
        }

        let request = match self.builder.build(subject, description) {
            BuildOutcome::Ready(request) => request,
            BuildOutcome::Skipped => {
                info!(subject, "No date found, event not created");
                return Ok(None);
            }
        };

        let services = self.provider.connect().await?;
        let entry = services
            .calendar
            .insert(&self.config.calendar_id, &request)
            .await?;
        info!(id = %entry.id, summary = %request.summary, "Event created");
        Ok(Some(entry))
    }

    pub fn config_summary(&self) -> ConfigSummary {
        self.config.summary()
    }

    async fn create_events(
        &self,
        calendar: &dyn CalendarService,
        emails: &[EmailMessage],
        now: DateTime<Utc>,
    ) -> Vec<ItemOutcome> {
        let pending: Vec<_> = emails
            .iter()
            .map(|email| self.create_one(calendar, email, now))
            .collect();
        stream::iter(pending)
            .buffered(self.config.event_concurrency.max(1))
            .collect()
            .await
    }

    async fn create_one(
        &self,
        calendar: &dyn CalendarService,
        email: &EmailMessage,
        now: DateTime<Utc>,
    ) -> ItemOutcome {
        let request = match self.builder.build_at(&email.subject, &email.body, now) {
            BuildOutcome::Ready(request) => request,
            BuildOutcome::Skipped => {
                info!(message_id = %email.id, subject = %email.subject, "No date found, skipping");
                return ItemOutcome::Skipped;
            }
        };

        match calendar.insert(&self.config.calendar_id, &request).await {
            Ok(entry) => {
                info!(message_id = %email.id, event_id = %entry.id, start = %request.start, "Event created");
                ItemOutcome::Created(entry)
            }
            Err(e) => {
                error!(message_id = %email.id, "Failed to create event: {}", e);
                ItemOutcome::Failed(e.to_string())
            }
        }
    }

    async fn digest_from(&self, calendar: &dyn CalendarService, now: DateTime<Utc>) -> String {
        let window = TimeWindow::rest_of_utc_day(now);
        match calendar
            .list_window(&self.config.calendar_id, window.start, window.end)
            .await
        {
            Ok(entries) => self.formatter.format(&entries, &window),
            Err(e) => {
                error!("Failed to fetch today's schedule: {}", e);
                SCHEDULE_UNAVAILABLE.to_string()
            }
        }
    }
}

fn enter(state: WorkflowState) {
    info!(state = %state, "Workflow state");
}

/// Decode everything the mailbox yields; broken items are logged and dropped
async fn collect_emails(mailbox: &dyn MailboxReader, query: &str, max_results: usize) -> Vec<EmailMessage> {
    let mut messages = mailbox.search(query, max_results);
    let mut emails = Vec::new();
    while let Some(raw) = messages.next().await {
        match raw {
            Ok(raw) => emails.push(decode_message(&raw)),
            Err(e) => error!("Failed to fetch email: {}", e),
        }
    }
    emails
}
