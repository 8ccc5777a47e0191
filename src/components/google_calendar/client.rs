use super::models::{CalendarEntry, EventsListResponse, GoogleEvent, GoogleEventTime};
use crate::components::{CalendarReader, CalendarWriter};
use crate::error::{google_calendar_error, AgendaResult};
use crate::scheduling::EventRequest;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use url::Url;

pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Reads and writes events on Google Calendar
#[derive(Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl GoogleCalendarClient {
    pub fn new(client: Client, access_token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: CALENDAR_API_BASE.to_string(),
            access_token: access_token.into(),
        }
    }

    /// Point the client at another API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn events_url(&self, calendar_id: &str) -> AgendaResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| google_calendar_error("Calendar API base URL cannot be a base"))?
            .extend(["calendars", calendar_id, "events"]);
        Ok(url)
    }
}

/// Calendar API body for a new event
pub fn to_google_event(request: &EventRequest) -> GoogleEvent {
    let tz: Option<Tz> = request.timezone.parse().ok();
    let stamp = |instant: DateTime<Utc>| match tz {
        Some(tz) => instant.with_timezone(&tz).to_rfc3339_opts(SecondsFormat::Secs, false),
        None => instant.to_rfc3339_opts(SecondsFormat::Secs, true),
    };

    GoogleEvent {
        id: None,
        summary: Some(request.summary.clone()),
        description: Some(request.description.clone()),
        start: Some(GoogleEventTime {
            date_time: Some(stamp(request.start)),
            date: None,
            time_zone: Some(request.timezone.clone()),
        }),
        end: Some(GoogleEventTime {
            date_time: Some(stamp(request.end)),
            date: None,
            time_zone: Some(request.timezone.clone()),
        }),
    }
}

#[async_trait]
impl CalendarWriter for GoogleCalendarClient {
    async fn insert(&self, calendar_id: &str, request: &EventRequest) -> AgendaResult<CalendarEntry> {
        let url = self.events_url(calendar_id)?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&to_google_event(request))
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to create event: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to create event: HTTP {} - {}",
                status, error_body
            )));
        }

        let created: GoogleEvent = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse created event: {}", e)))?;

        Ok(created.into())
    }
}

#[async_trait]
impl CalendarReader for GoogleCalendarClient {
    async fn list_window(
        &self,
        calendar_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AgendaResult<Vec<CalendarEntry>> {
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.events_url(calendar_id)?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("timeMin", &start.to_rfc3339_opts(SecondsFormat::Secs, true));
                query.append_pair("timeMax", &end.to_rfc3339_opts(SecondsFormat::Secs, true));
                query.append_pair("singleEvents", "true");
                query.append_pair("orderBy", "startTime");
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let response = self
                .client
                .get(url)
                .bearer_auth(&self.access_token)
                .send()
                .await
                .map_err(|e| google_calendar_error(&format!("Failed to fetch events: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let error_body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Could not read error response".to_string());
                return Err(google_calendar_error(&format!(
                    "Failed to fetch events: HTTP {} - {}",
                    status, error_body
                )));
            }

            let page: EventsListResponse = response
                .json()
                .await
                .map_err(|e| google_calendar_error(&format!("Failed to parse events response: {}", e)))?;

            entries.extend(page.items.unwrap_or_default().into_iter().map(CalendarEntry::from));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_body_uses_display_timezone() {
        let request = EventRequest {
            summary: "Budget".to_string(),
            description: "tomorrow at 3pm".to_string(),
            start: Utc.with_ymd_and_hms(2026, 10, 20, 12, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 10, 20, 13, 0, 0).unwrap(),
            timezone: "Europe/Helsinki".to_string(),
        };
        let event = to_google_event(&request);
        let start = event.start.unwrap();

        assert_eq!(start.date_time.as_deref(), Some("2026-10-20T15:00:00+03:00"));
        assert_eq!(start.time_zone.as_deref(), Some("Europe/Helsinki"));
        assert_eq!(event.end.unwrap().date_time.as_deref(), Some("2026-10-20T16:00:00+03:00"));
    }

    #[test]
    fn test_events_url_escapes_calendar_id() {
        let client = GoogleCalendarClient::new(Client::new(), "token");
        let url = client.events_url("team@group.calendar.google.com").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/team@group.calendar.google.com/events"
        );

        let url = client.events_url("en.finnish#holiday").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/en.finnish%23holiday/events"
        );
    }
}
