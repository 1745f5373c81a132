//! Liveness endpoint

use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};

pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": state.app_name,
        "version": state.version,
        "email_configured": state.contact_service.is_configured(),
        "timestamp": chrono::Utc::now().timestamp(),
    }))
}
