use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::outcome::{Outcome, FALLBACK_ERROR, NON_JSON_ERROR};

/// How long the success banner stays before the form returns to idle.
pub const DEFAULT_RESET_DELAY: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Message,
}

impl FromStr for Field {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Field::Name),
            "email" => Ok(Field::Email),
            "message" => Ok(Field::Message),
            other => Err(FormError::UnknownField(other.to_string())),
        }
    }
}

/// The three values currently typed into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormFields {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl FormFields {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Message => &self.message,
        }
    }

    fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::Message => self.message = value,
        }
    }

    fn clear(&mut self) {
        *self = FormFields::default();
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error("A submission is already in flight")]
    SubmissionInFlight,

    #[error("Unknown form field: {0}")]
    UnknownField(String),
}

#[derive(Default)]
struct FormState {
    fields: FormFields,
    outcome: Outcome,
    /// Incremented on every submit; a pending reset only applies to its own attempt.
    attempt: u64,
    reset_task: Option<JoinHandle<()>>,
}

/// Handle to one contact form instance. Clones share the same state.
#[derive(Clone)]
pub struct ContactForm {
    endpoint: String,
    client: reqwest::Client,
    reset_delay: Duration,
    state: Arc<Mutex<FormState>>,
}

impl ContactForm {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
            reset_delay: DEFAULT_RESET_DELAY,
            state: Arc::new(Mutex::new(FormState::default())),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_reset_delay(mut self, delay: Duration) -> Self {
        self.reset_delay = delay;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn update_field(&self, field: Field, value: impl Into<String>) {
        self.state.lock().fields.set(field, value.into());
    }

    pub fn update_field_by_name(&self, name: &str, value: impl Into<String>) -> Result<(), FormError> {
        let field = name.parse()?;
        self.update_field(field, value);
        Ok(())
    }

    pub fn fields(&self) -> FormFields {
        self.state.lock().fields.clone()
    }

    pub fn outcome(&self) -> Outcome {
        self.state.lock().outcome.clone()
    }

    /// False only while a submission is in flight.
    pub fn can_submit(&self) -> bool {
        !self.state.lock().outcome.is_loading()
    }

    pub fn status_message(&self) -> Option<String> {
        self.state.lock().outcome.message().map(str::to_string)
    }

    /// Sends the current fields to the relay and records the outcome.
    ///
    /// The round trip runs on its own task, so dropping the returned future
    /// does not abandon the attempt in the loading state.
    pub async fn submit(&self) -> Result<Outcome, FormError> {
        let (attempt, payload) = {
            let mut state = self.state.lock();
            if state.outcome.is_loading() {
                return Err(FormError::SubmissionInFlight);
            }
            if let Some(task) = state.reset_task.take() {
                task.abort();
            }
            state.attempt += 1;
            state.outcome = Outcome::Loading;
            (state.attempt, state.fields.clone())
        };

        debug!(attempt, endpoint = %self.endpoint, "Submitting contact form");

        let form = self.clone();
        let round_trip = tokio::spawn(async move {
            let outcome = match form.send(&payload).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(error = %e, "Contact form request failed");
                    Outcome::Error(format!("Network error: {}", e))
                }
            };
            form.finish(attempt, outcome.clone());
            outcome
        });

        Ok(match round_trip.await {
            Ok(outcome) => outcome,
            Err(e) => {
                let outcome = Outcome::Error(format!("Network error: {}", e));
                self.finish(attempt, outcome.clone());
                outcome
            }
        })
    }

    async fn send(&self, fields: &FormFields) -> Result<Outcome, reqwest::Error> {
        let response = self.client.post(&self.endpoint).json(fields).send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), "Contact form response");

        if !declares_json(response.headers()) {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Non-JSON response from relay");
            return Ok(Outcome::Error(NON_JSON_ERROR.to_string()));
        }

        let body: Value = response.json().await?;

        if status.is_success() {
            debug!(message_id = ?body.get("messageId"), "Contact form accepted");
            return Ok(Outcome::Success);
        }

        let message = body
            .get("error")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .unwrap_or(FALLBACK_ERROR);
        Ok(Outcome::Error(message.to_string()))
    }

    fn finish(&self, attempt: u64, outcome: Outcome) {
        let mut state = self.state.lock();
        if state.attempt != attempt {
            return;
        }

        if outcome == Outcome::Success {
            state.fields.clear();
            state.reset_task = Some(self.schedule_reset(attempt));
        }
        state.outcome = outcome;
    }

    fn schedule_reset(&self, attempt: u64) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let delay = self.reset_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut state = state.lock();
            if state.attempt == attempt && state.outcome == Outcome::Success {
                state.outcome = Outcome::Idle;
                state.reset_task = None;
            }
        })
    }
}

fn declares_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<mime::Mime>().ok())
        .is_some_and(|media| {
            media.type_() == mime::APPLICATION
                && (media.subtype() == mime::JSON || media.suffix() == Some(mime::JSON))
        })
}
