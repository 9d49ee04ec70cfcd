use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use openai_client::Message;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::app::AppState;
use crate::error::ProxyError;

/// Body accepted by `POST /api/chat` and forwarded upstream unchanged.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatForward {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<serde_json::Value>,
}

pub async fn chat_status() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "route": "chat" }))
}

/// Forward a chat completion with the server-held key and relay the
/// upstream status and body verbatim.
pub async fn chat_handler(
    State(state): State<AppState>,
    body: Result<Json<ChatForward>, JsonRejection>,
) -> Result<Response, ProxyError> {
    let Json(request) = body.map_err(|e| ProxyError::BadRequest(e.body_text()))?;

    let key = state
        .config
        .openai_api_key
        .as_ref()
        .ok_or(ProxyError::NotConfigured("OPENAI_API_KEY"))?;

    let endpoint = format!(
        "{}/chat/completions",
        state.config.openai_base_url.trim_end_matches('/')
    );

    let response = state
        .llm
        .post(&endpoint)
        .bearer_auth(key.expose_secret())
        .json(&request)
        .send()
        .await
        .map_err(|e| {
            warn!(model = %request.model, error = %e, "Chat forward failed");
            ProxyError::from(e)
        })?;

    let status = StatusCode::from_u16(response.status().as_u16())
        .map_err(|e| ProxyError::Internal(e.to_string()))?;
    let body = response.text().await.map_err(ProxyError::from)?;

    info!(model = %request.model, status = status.as_u16(), "Chat forwarded");

    Ok((status, [(CONTENT_TYPE, "application/json")], body).into_response())
}
