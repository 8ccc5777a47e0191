#![cfg(feature = "web-interface")]

mod mocks;

use agendabot::api::{router, AppState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mocks::*;
use std::sync::Arc;
use tower::util::ServiceExt;

fn test_app(provider: MockProvider) -> Router {
    let orchestrator = orchestrator(test_config(), Arc::new(provider), Arc::new(MockNotifier::default()));
    router(AppState::new(Arc::new(orchestrator)))
}

fn working_app() -> Router {
    let mailbox = MockMailbox::new(vec![Ok(raw_message("m1", "Budget", "tomorrow at 3pm"))]);
    test_app(MockProvider::new(mailbox, MockCalendar::default()))
}

async fn body_to_string(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn json_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn it_reports_health() {
    let response = working_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_to_string(response.into_body()).await.contains("\"ok\""));
}

#[tokio::test]
async fn it_shows_public_config() {
    let response = working_app()
        .oneshot(Request::builder().uri("/api/config").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_string(response.into_body()).await;
    assert!(body.contains("\"gmail_query\""));
    assert!(body.contains("\"default_event_duration\":60"));
}

#[tokio::test]
async fn it_runs_the_assistant_without_a_body() {
    let response = working_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/run-assistant")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_string(response.into_body()).await;
    assert!(body.contains("\"emails_processed\":1"));
    assert!(body.contains("\"events_created\":1"));
}

#[tokio::test]
async fn it_fails_the_run_on_auth_errors() {
    let response = test_app(MockProvider::failing())
        .oneshot(json_post("/api/run-assistant", r#"{"send_notification":false}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_to_string(response.into_body()).await.contains("Authentication"));
}

#[tokio::test]
async fn it_fetches_emails() {
    let response = working_app()
        .oneshot(json_post("/api/fetch-emails", r#"{"query":"label:inbox","max_results":5}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_string(response.into_body()).await;
    assert!(body.contains("\"count\":1"));
    assert!(body.contains("\"subject\":\"Budget\""));
}

#[tokio::test]
async fn it_previews_events_without_creating_them() {
    let mailbox = MockMailbox::new(vec![
        Ok(raw_message("m1", "Budget", "tomorrow at 3pm")),
        Ok(raw_message("m2", "Newsletter", "nothing to see")),
    ]);
    let response = test_app(MockProvider::new(mailbox, MockCalendar::default()))
        .oneshot(json_post("/api/preview-events", r#"{"max_results":5}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_string(response.into_body()).await;
    assert!(body.contains("\"count\":2"));
    assert!(body.contains("\"status\":\"ready\""));
    assert!(body.contains("\"status\":\"skipped\""));
}

#[tokio::test]
async fn it_returns_the_schedule() {
    let response = working_app()
        .oneshot(Request::builder().uri("/api/schedule").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_to_string(response.into_body())
        .await
        .contains("No meetings scheduled for today"));
}

#[tokio::test]
async fn it_rejects_blank_subjects() {
    let response = working_app()
        .oneshot(json_post("/api/create-event", r#"{"subject":"  ","description":"tomorrow at 3pm"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn it_creates_events() {
    let response = working_app()
        .oneshot(json_post(
            "/api/create-event",
            r#"{"subject":"Dentist","description":"tomorrow at 8am"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_string(response.into_body()).await;
    assert!(body.contains("\"created\":true"));
}

#[tokio::test]
async fn it_reports_descriptions_without_dates() {
    let response = working_app()
        .oneshot(json_post("/api/create-event", r#"{"subject":"Lunch"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_to_string(response.into_body()).await.contains("\"created\":false"));
}
