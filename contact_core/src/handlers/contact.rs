//! Contact form relay endpoint

use crate::{
    error::Result,
    extractors::LenientJson,
    models::{ContactSubmission, SendEmailResponse},
    AppState,
};
use axum::{extract::State, Json};
use tracing::info;

pub async fn handle_send_email(
    State(state): State<AppState>,
    LenientJson(submission): LenientJson<ContactSubmission>,
) -> Result<Json<SendEmailResponse>> {
    info!(
        has_name = submission.name.is_some(),
        has_email = submission.email.is_some(),
        has_message = submission.message.is_some(),
        "POST /api/send-email"
    );

    let message_id = state.contact_service.submit(submission).await?;

    Ok(Json(SendEmailResponse {
        message: "Email sent successfully".to_string(),
        message_id: message_id.into_inner(),
    }))
}
