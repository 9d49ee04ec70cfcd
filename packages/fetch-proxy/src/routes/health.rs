use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: &'static str,
    chat_configured: bool,
}

/// Health check endpoint
///
/// Always 200 once the server is listening. `chat_configured` reports
/// whether `/api/chat` can forward requests.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION"),
            chat_configured: state.config.openai_api_key.is_some(),
        }),
    )
}
