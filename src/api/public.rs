//! Request and response bodies of the HTTP API

use crate::components::gmail::EmailMessage;
use crate::components::google_calendar::CalendarEntry;
use crate::error::Error;
use crate::scheduling::BuildOutcome;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Default, Deserialize)]
pub struct RunAssistantRequest {
    pub gmail_query: Option<String>,
    pub max_results: Option<usize>,
    pub send_notification: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FetchEmailsRequest {
    pub query: Option<String>,
    pub max_results: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct FetchEmailsResponse {
    pub count: usize,
    pub emails: Vec<EmailMessage>,
}

/// One email with the event that would be created from it
#[derive(Debug, Serialize)]
pub struct PreviewItem {
    pub email: EmailMessage,
    pub event: BuildOutcome,
}

#[derive(Debug, Serialize)]
pub struct PreviewEventsResponse {
    pub count: usize,
    pub items: Vec<PreviewItem>,
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub schedule: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub subject: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct CreateEventResponse {
    pub created: bool,
    pub event: Option<CalendarEntry>,
    pub message: String,
}

/// Crate error rendered as a JSON response
pub struct ApiError(pub Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("{}", self.0);
        } else {
            tracing::warn!("{}", self.0);
        }

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}
