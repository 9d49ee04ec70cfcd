//! OpenRouter provider (free-tier fallback).
//!
//! OpenRouter speaks the OpenAI wire format, but most free models only honor
//! `json_object` mode, so the schema is described in the prompt and any
//! markdown fences around the reply are stripped.

use async_trait::async_trait;
use openai_client::{json_payload, ChatRequest, Message, OpenAIClient, OpenAIError};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::traits::provider::{ChatProvider, JsonRequest};

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Title reported to OpenRouter for attribution.
const APP_TITLE: &str = "linkcheck";

pub struct OpenRouterProvider {
    client: OpenAIClient,
    has_key: bool,
    model: String,
}

impl OpenRouterProvider {
    pub fn new(
        api_key: SecretString,
        model: impl Into<String>,
        referer: Option<&str>,
    ) -> Result<Self, OpenAIError> {
        let key = api_key.expose_secret();
        let mut client = OpenAIClient::new(key)
            .with_base_url(OPENROUTER_BASE_URL)
            .with_header("X-Title", APP_TITLE)?;
        if let Some(referer) = referer {
            client = client.with_header("HTTP-Referer", referer)?;
        }

        Ok(Self {
            client,
            has_key: !key.trim().is_empty(),
            model: model.into(),
        })
    }

    /// Point at another endpoint (tests, self-hosted gateways).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(base_url);
        self
    }
}

fn system_with_schema(request: &JsonRequest) -> String {
    format!(
        "{}\n\nRespond with a single JSON object matching this JSON schema, and nothing else:\n{}",
        request.system, request.schema
    )
}

#[async_trait]
impl ChatProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn complete_json(&self, request: &JsonRequest) -> Result<String, OpenAIError> {
        debug!(model = %self.model, schema = %request.schema_name, "OpenRouter JSON completion");

        let chat = ChatRequest::new(&self.model)
            .message(Message::system(system_with_schema(request)))
            .message(Message::user(&request.user))
            .temperature(request.temperature)
            .json_object();

        let response = self.client.chat_completion(chat).await?;
        Ok(json_payload(&response.content).to_string())
    }

    fn is_available(&self) -> bool {
        self.has_key
    }
}
