//! OpenAI provider using strict structured output.

use async_trait::async_trait;
use openai_client::{ChatRequest, Message, OpenAIClient, OpenAIError};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::traits::provider::{ChatProvider, JsonRequest};

/// OpenAI chat completions with `response_format: json_schema` (strict).
pub struct OpenAIProvider {
    client: OpenAIClient,
    has_key: bool,
    /// Fixed model; falls back to the request's model when unset
    model: Option<String>,
}

impl OpenAIProvider {
    pub fn new(api_key: SecretString) -> Self {
        let key = api_key.expose_secret();
        Self {
            client: OpenAIClient::new(key),
            has_key: !key.trim().is_empty(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    /// Point at another OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(base_url);
        self
    }
}

#[async_trait]
impl ChatProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete_json(&self, request: &JsonRequest) -> Result<String, OpenAIError> {
        let model = self.model.as_deref().unwrap_or(&request.model);
        debug!(model = %model, schema = %request.schema_name, "OpenAI structured completion");

        let chat = ChatRequest::new(model)
            .message(Message::system(&request.system))
            .message(Message::user(&request.user))
            .temperature(request.temperature)
            .json_schema(&request.schema_name, request.schema.clone());

        let response = self.client.chat_completion(chat).await?;
        Ok(response.content)
    }

    fn is_available(&self) -> bool {
        self.has_key
    }
}
