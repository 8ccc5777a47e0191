use super::public::{
    ApiError, CreateEventRequest, CreateEventResponse, FetchEmailsRequest, FetchEmailsResponse,
    PreviewEventsResponse, PreviewItem, RunAssistantRequest, ScheduleResponse,
};
use super::AppState;
use crate::config::ConfigSummary;
use crate::workflow::WorkflowSummary;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "agendabot" }))
}

pub async fn config(State(state): State<AppState>) -> Json<ConfigSummary> {
    Json(state.orchestrator.config_summary())
}

pub async fn run_assistant(
    State(state): State<AppState>,
    body: Option<Json<RunAssistantRequest>>,
) -> Result<Json<WorkflowSummary>, ApiError> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let summary = state
        .orchestrator
        .run_workflow(
            request.gmail_query.as_deref(),
            request.max_results,
            request.send_notification.unwrap_or(true),
        )
        .await?;
    Ok(Json(summary))
}

pub async fn fetch_emails(
    State(state): State<AppState>,
    body: Option<Json<FetchEmailsRequest>>,
) -> Result<Json<FetchEmailsResponse>, ApiError> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let emails = state
        .orchestrator
        .fetch_emails(request.query.as_deref(), request.max_results)
        .await?;
    Ok(Json(FetchEmailsResponse {
        count: emails.len(),
        emails,
    }))
}

pub async fn preview_events(
    State(state): State<AppState>,
    body: Option<Json<FetchEmailsRequest>>,
) -> Result<Json<PreviewEventsResponse>, ApiError> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let items: Vec<PreviewItem> = state
        .orchestrator
        .fetch_and_build_events(request.query.as_deref(), request.max_results)
        .await?
        .into_iter()
        .map(|(email, event)| PreviewItem { email, event })
        .collect();
    Ok(Json(PreviewEventsResponse {
        count: items.len(),
        items,
    }))
}

pub async fn schedule(State(state): State<AppState>) -> Result<Json<ScheduleResponse>, ApiError> {
    let schedule = state.orchestrator.get_today_digest().await?;
    Ok(Json(ScheduleResponse { schedule }))
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<Json<CreateEventResponse>, ApiError> {
    let event = state
        .orchestrator
        .create_event(&request.subject, &request.description)
        .await?;

    let response = match event {
        Some(event) => CreateEventResponse {
            created: true,
            event: Some(event),
            message: "Event created".to_string(),
        },
        None => CreateEventResponse {
            created: false,
            event: None,
            message: "No date or time found in the description".to_string(),
        },
    };
    Ok(Json(response))
}
