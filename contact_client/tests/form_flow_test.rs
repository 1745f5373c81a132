use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use contact_client::{ContactForm, Field, FormError, FormFields, Outcome};
use contact_core::{
    create_app_with_config, AppConfig, AppState, ContactEmail, DeliveryId, MailTransport,
    TransportError, SEND_EMAIL_PATH,
};
use serde_json::{json, Value};

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn canned_relay() -> Router {
    Router::new()
        .route(
            "/ok",
            post(|Json(body): Json<Value>| async move {
                assert!(body.get("name").is_some());
                Json(json!({ "message": "Email sent successfully", "messageId": "abc123" }))
            }),
        )
        .route(
            "/bad",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "All fields are required" })),
                )
            }),
        )
        .route(
            "/bare-error",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))) }),
        )
        .route(
            "/html-error",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                    "<html><body>Internal Server Error</body></html>",
                )
                    .into_response()
            }),
        )
        .route(
            "/html-ok",
            post(|| async {
                (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, "text/html")],
                    "<html><body>ok</body></html>",
                )
                    .into_response()
            }),
        )
        .route(
            "/broken-json",
            post(|| async {
                (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, "application/json")],
                    "{not json",
                )
                    .into_response()
            }),
        )
        .route(
            "/slow",
            post(|| async {
                tokio::time::sleep(Duration::from_millis(300)).await;
                Json(json!({ "message": "Email sent successfully", "messageId": "slow" }))
            }),
        )
}

fn filled(form: &ContactForm) {
    form.update_field(Field::Name, "Ada");
    form.update_field(Field::Email, "ada@example.com");
    form.update_field(Field::Message, "Hello");
}

fn entered() -> FormFields {
    FormFields {
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        message: "Hello".to_string(),
    }
}

#[tokio::test]
async fn test_success_clears_fields_and_returns_to_idle() {
    let addr = serve(canned_relay()).await;
    let form = ContactForm::new(format!("http://{}/ok", addr))
        .with_reset_delay(Duration::from_millis(100));
    filled(&form);

    let outcome = form.submit().await.unwrap();

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(form.outcome(), Outcome::Success);
    assert_eq!(form.fields(), FormFields::default());
    assert_eq!(
        form.status_message().as_deref(),
        Some("Message sent successfully! We'll get back to you soon.")
    );

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(form.outcome(), Outcome::Idle);
    assert_eq!(form.status_message(), None);
}

#[tokio::test]
async fn test_error_keeps_fields_and_uses_server_message() {
    let addr = serve(canned_relay()).await;
    let form = ContactForm::new(format!("http://{}/bad", addr))
        .with_reset_delay(Duration::from_millis(50));
    filled(&form);

    let outcome = form.submit().await.unwrap();

    assert_eq!(outcome, Outcome::Error("All fields are required".to_string()));
    assert_eq!(form.fields(), entered());

    // Errors have no automatic transition.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(form.outcome(), Outcome::Error("All fields are required".to_string()));
}

#[tokio::test]
async fn test_error_without_message_uses_fallback() {
    let addr = serve(canned_relay()).await;
    let form = ContactForm::new(format!("http://{}/bare-error", addr));
    filled(&form);

    assert_eq!(
        form.submit().await.unwrap(),
        Outcome::Error("Failed to send message".to_string())
    );
}

#[tokio::test]
async fn test_non_json_response_is_an_error_whatever_the_status() {
    let addr = serve(canned_relay()).await;

    for path in ["html-error", "html-ok"] {
        let form = ContactForm::new(format!("http://{}/{}", addr, path));
        filled(&form);

        assert_eq!(
            form.submit().await.unwrap(),
            Outcome::Error("Server error - check terminal for details".to_string()),
            "path {path}"
        );
        assert_eq!(form.fields(), entered(), "path {path}");
    }
}

#[tokio::test]
async fn test_unreadable_json_is_a_network_error() {
    let addr = serve(canned_relay()).await;
    let form = ContactForm::new(format!("http://{}/broken-json", addr));
    filled(&form);

    match form.submit().await.unwrap() {
        Outcome::Error(message) => assert!(message.starts_with("Network error: "), "{message}"),
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_relay_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let form = ContactForm::new(format!("http://{}/ok", addr));
    filled(&form);

    match form.submit().await.unwrap() {
        Outcome::Error(message) => assert!(message.starts_with("Network error: "), "{message}"),
        other => panic!("expected error, got {other:?}"),
    }
    assert_eq!(form.fields(), entered());
    assert!(form.can_submit());
}

#[tokio::test]
async fn test_submit_is_disabled_while_loading() {
    let addr = serve(canned_relay()).await;
    let form = ContactForm::new(format!("http://{}/slow", addr));
    filled(&form);

    let in_flight = {
        let form = form.clone();
        tokio::spawn(async move { form.submit().await })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(form.outcome(), Outcome::Loading);
    assert!(!form.can_submit());
    assert_eq!(form.submit().await, Err(FormError::SubmissionInFlight));

    assert_eq!(in_flight.await.unwrap(), Ok(Outcome::Success));
    assert!(form.can_submit());
}

/// Relay that answers like the real endpoint: 400 unless all fields are non-empty.
fn validating_relay() -> Router {
    Router::new().route(
        "/validate",
        post(|Json(body): Json<Value>| async move {
            let present = ["name", "email", "message"]
                .iter()
                .all(|key| body[key].as_str().is_some_and(|v| !v.is_empty()));
            if present {
                (
                    StatusCode::OK,
                    Json(json!({ "message": "Email sent successfully", "messageId": "abc123" })),
                )
            } else {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "All fields are required" })),
                )
            }
        }),
    )
}

#[tokio::test]
async fn test_resubmit_after_error() {
    let addr = serve(validating_relay()).await;
    let form = ContactForm::new(format!("http://{}/validate", addr));
    form.update_field(Field::Name, "Ada");
    form.update_field(Field::Email, "ada@example.com");

    assert_eq!(
        form.submit().await.unwrap(),
        Outcome::Error("All fields are required".to_string())
    );
    assert!(form.can_submit());

    form.update_field(Field::Message, "Hello");
    assert_eq!(form.submit().await.unwrap(), Outcome::Success);
}

#[tokio::test]
async fn test_stale_reset_does_not_clobber_later_error() {
    let addr = serve(validating_relay()).await;
    let form = ContactForm::new(format!("http://{}/validate", addr))
        .with_reset_delay(Duration::from_millis(150));
    filled(&form);
    assert_eq!(form.submit().await.unwrap(), Outcome::Success);

    // Fields were cleared, so this attempt fails before the first reset is due.
    assert!(matches!(form.submit().await.unwrap(), Outcome::Error(_)));

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(form.outcome(), Outcome::Error("All fields are required".to_string()));
}

#[tokio::test]
async fn test_new_success_restarts_reset_window() {
    let addr = serve(validating_relay()).await;
    let form = ContactForm::new(format!("http://{}/validate", addr))
        .with_reset_delay(Duration::from_millis(600));
    filled(&form);
    assert_eq!(form.submit().await.unwrap(), Outcome::Success);

    tokio::time::sleep(Duration::from_millis(300)).await;
    filled(&form);
    assert_eq!(form.submit().await.unwrap(), Outcome::Success);

    // Past the first window but inside the second one.
    tokio::time::sleep(Duration::from_millis(450)).await;
    assert_eq!(form.outcome(), Outcome::Success);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(form.outcome(), Outcome::Idle);
}

/// Accepts everything and reports a fixed message id.
struct AcceptingTransport;

#[async_trait]
impl MailTransport for AcceptingTransport {
    async fn send(&self, _email: &ContactEmail) -> Result<DeliveryId, TransportError> {
        Ok(DeliveryId("<e2e@skykin.tech>".to_string()))
    }
}

#[tokio::test]
async fn test_end_to_end_against_relay() {
    let mut config = AppConfig::default();
    config.smtp.user = Some("relay@skykin.tech".to_string());
    config.smtp.password = Some("secret".to_string());
    let state = AppState::with_transport(&config, Arc::new(AcceptingTransport));
    let addr = serve(create_app_with_config(state, &config)).await;

    let form = ContactForm::new(format!("http://{}{}", addr, SEND_EMAIL_PATH));
    assert_eq!(
        form.submit().await.unwrap(),
        Outcome::Error("All fields are required".to_string())
    );

    filled(&form);
    assert_eq!(form.submit().await.unwrap(), Outcome::Success);
    assert_eq!(form.fields(), FormFields::default());
}
