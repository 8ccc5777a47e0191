use serde::{Deserialize, Serialize};

/// Calendar entry as read back from the calendar.
///
/// Timed entries carry `start_date_time`, all-day entries carry `start_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CalendarEntry {
    pub id: String,
    pub summary: Option<String>,
    pub start_date_time: Option<String>,
    pub start_date: Option<String>,
    pub end_date_time: Option<String>,
    pub end_date: Option<String>,
}

/// Start or end of an event in the Calendar API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleEventTime {
    #[serde(rename = "dateTime", skip_serializing_if = "Option::is_none", default)]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub date: Option<String>,
    #[serde(rename = "timeZone", skip_serializing_if = "Option::is_none", default)]
    pub time_zone: Option<String>,
}

/// Event resource of the Calendar API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleEvent {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub start: Option<GoogleEventTime>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub end: Option<GoogleEventTime>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventsListResponse {
    pub items: Option<Vec<GoogleEvent>>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

impl From<GoogleEvent> for CalendarEntry {
    fn from(event: GoogleEvent) -> Self {
        let start = event.start.unwrap_or_default();
        let end = event.end.unwrap_or_default();
        CalendarEntry {
            id: event.id.unwrap_or_default(),
            summary: event.summary,
            start_date_time: start.date_time,
            start_date: start.date,
            end_date_time: end.date_time,
            end_date: end.date,
        }
    }
}
