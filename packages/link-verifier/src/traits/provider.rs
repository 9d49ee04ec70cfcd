//! LLM provider trait.
//!
//! Classification and verification only need one capability from a model
//! backend: answer a system + user prompt with a JSON document. Each
//! provider adapts that to its own wire format.

use async_trait::async_trait;
use openai_client::OpenAIError;

/// A single JSON-producing completion request.
#[derive(Debug, Clone)]
pub struct JsonRequest {
    /// Preferred model; providers with a fixed model ignore it
    pub model: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,

    /// Name of the expected response type
    pub schema_name: String,

    /// Strict JSON schema of the expected response
    pub schema: serde_json::Value,
}

/// LLM chat-completion backend.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Run the request and return the raw JSON text of the reply.
    async fn complete_json(&self, request: &JsonRequest) -> Result<String, OpenAIError>;

    /// Whether the provider can serve requests at all (credentials present).
    fn is_available(&self) -> bool {
        true
    }
}
