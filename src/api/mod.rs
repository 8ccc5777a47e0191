//! HTTP API over the workflow orchestrator

mod handlers;
pub mod public;

use crate::workflow::WorkflowOrchestrator;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<WorkflowOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Arc<WorkflowOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/api/config", get(handlers::config))
        .route("/api/run-assistant", post(handlers::run_assistant))
        .route("/api/fetch-emails", post(handlers::fetch_emails))
        .route("/api/preview-events", post(handlers::preview_events))
        .route("/api/schedule", get(handlers::schedule))
        .route("/api/create-event", post(handlers::create_event))
        .with_state(state)
}
