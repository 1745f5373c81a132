//! Per-request tracing for the relay endpoints

use std::time::Duration;

use http::{header, Request, Response, StatusCode};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    trace::{DefaultOnBodyChunk, DefaultOnEos, MakeSpan, OnResponse, TraceLayer},
};
use tracing::{field, info_span, Span};

use crate::handlers::routes::SEND_EMAIL_PATH;

pub type RelayTraceLayer = TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    RelaySpan,
    (),
    RelayResponseLog,
    DefaultOnBodyChunk,
    DefaultOnEos,
    (),
>;

/// Server errors are logged by [`RelayResponseLog`], so the failure callback is silent.
pub fn logging_layer() -> RelayTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(RelaySpan)
        .on_request(())
        .on_response(RelayResponseLog)
        .on_failure(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    SendEmail,
    Health,
    Other,
}

impl Endpoint {
    pub fn from_path(path: &str) -> Self {
        match path {
            SEND_EMAIL_PATH => Endpoint::SendEmail,
            "/health" => Endpoint::Health,
            _ => Endpoint::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::SendEmail => "send_email",
            Endpoint::Health => "health",
            Endpoint::Other => "other",
        }
    }
}

/// What a response status means for a submission.
pub fn submission_outcome(status: StatusCode) -> &'static str {
    if status.is_success() {
        "relayed"
    } else if status.is_client_error() {
        "rejected"
    } else {
        "failed"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RelaySpan;

impl<B> MakeSpan<B> for RelaySpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let origin = request
            .headers()
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-");

        info_span!(
            "relay_request",
            endpoint = Endpoint::from_path(request.uri().path()).as_str(),
            method = %request.method(),
            origin = %origin,
            status = field::Empty,
            outcome = field::Empty,
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RelayResponseLog;

impl<B> OnResponse<B> for RelayResponseLog {
    fn on_response(self, response: &Response<B>, latency: Duration, span: &Span) {
        let status = response.status();
        let outcome = submission_outcome(status);
        let latency_ms = latency.as_millis() as u64;

        span.record("status", status.as_u16());
        span.record("outcome", outcome);

        if status.is_success() {
            tracing::info!(status = status.as_u16(), latency_ms, outcome, "request completed");
        } else if status.is_client_error() {
            tracing::warn!(status = status.as_u16(), latency_ms, outcome, "request rejected");
        } else {
            tracing::error!(status = status.as_u16(), latency_ms, outcome, "request failed");
        }
    }
}
