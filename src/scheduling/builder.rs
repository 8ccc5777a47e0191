use super::extractor::DateTimeExtractor;
use crate::config::{Config, MAX_EVENT_DURATION_MIN};
use crate::error::{AgendaResult, Error};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Summary used when an email has no subject
pub const NO_SUBJECT: &str = "(No subject)";

/// Maximum number of characters copied from the body into the description
pub const DESCRIPTION_LIMIT: usize = 500;

/// A calendar event ready to be inserted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRequest {
    pub summary: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// IANA timezone the event is shown in
    pub timezone: String,
}

/// Result of turning one email into an event request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildOutcome {
    Ready(EventRequest),
    /// No date could be read from the body
    Skipped,
}

impl BuildOutcome {
    pub fn request(&self) -> Option<&EventRequest> {
        match self {
            BuildOutcome::Ready(request) => Some(request),
            BuildOutcome::Skipped => None,
        }
    }
}

/// Builds event requests from email subjects and bodies
#[derive(Debug, Clone)]
pub struct EventRequestBuilder {
    extractor: DateTimeExtractor,
    duration: Duration,
    timezone: String,
}

impl EventRequestBuilder {
    pub fn new(extractor: DateTimeExtractor, duration_minutes: i64) -> AgendaResult<Self> {
        let duration = Some(duration_minutes)
            .filter(|m| (1..=MAX_EVENT_DURATION_MIN).contains(m))
            .and_then(Duration::try_minutes)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "Event duration must be between 1 and {} minutes, got {}",
                    MAX_EVENT_DURATION_MIN, duration_minutes
                ))
            })?;
        let timezone = extractor.timezone().name().to_string();
        Ok(Self {
            extractor,
            duration,
            timezone,
        })
    }

    pub fn from_config(config: &Config) -> AgendaResult<Self> {
        Self::new(DateTimeExtractor::new(config.tz()?), config.default_event_duration_min)
    }

    pub fn build(&self, subject: &str, body: &str) -> BuildOutcome {
        self.build_at(subject, body, Utc::now())
    }

    /// Build against a fixed "now"
    pub fn build_at(&self, subject: &str, body: &str, now: DateTime<Utc>) -> BuildOutcome {
        let Some(candidate) = self.extractor.extract_at(body, now) else {
            return BuildOutcome::Skipped;
        };
        let Some(end) = candidate.start.checked_add_signed(self.duration) else {
            return BuildOutcome::Skipped;
        };

        let summary = if subject.trim().is_empty() {
            NO_SUBJECT.to_string()
        } else {
            subject.to_string()
        };

        BuildOutcome::Ready(EventRequest {
            summary,
            description: truncate_description(body),
            start: candidate.start,
            end,
            timezone: self.timezone.clone(),
        })
    }
}

/// First `DESCRIPTION_LIMIT` characters of the body
pub fn truncate_description(body: &str) -> String {
    body.chars().take(DESCRIPTION_LIMIT).collect()
}
