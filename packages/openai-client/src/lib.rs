//! Minimal OpenAI-compatible chat completion client.
//!
//! Talks to any endpoint that speaks the `/chat/completions` wire format
//! (OpenAI itself, OpenRouter, self-hosted gateways) and asks for either a
//! bare JSON object or a reply constrained by a strict schema generated from
//! a Rust type.
//!
//! ```rust,ignore
//! use openai_client::{ChatRequest, Message, OpenAIClient, StructuredOutput};
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct Relevance {
//!     is_relevant: bool,
//!     reasoning: String,
//! }
//!
//! let client = OpenAIClient::new(api_key);
//! let reply = client
//!     .chat_completion(
//!         ChatRequest::new("gpt-4o-mini")
//!             .message(Message::system(system_prompt))
//!             .message(Message::user(page_excerpt))
//!             .json_schema(Relevance::type_name(), Relevance::openai_schema()),
//!     )
//!     .await?;
//! let verdict: Relevance = serde_json::from_str(json_payload(&reply.content))?;
//! ```

pub mod error;
pub mod schema;
pub mod types;

pub use error::{OpenAIError, Result};
pub use schema::StructuredOutput;
pub use types::*;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Upper bound per completion; verification prompts carry page excerpts.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// OpenAI-compatible chat completion client.
#[derive(Clone)]
pub struct OpenAIClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    extra_headers: HeaderMap,
}

impl std::fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_string(),
            extra_headers: HeaderMap::new(),
        }
    }

    /// Set a custom base URL (OpenRouter, Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Send an extra header with every request.
    ///
    /// Invalid header names or values are rejected with a config error.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| OpenAIError::Config(format!("invalid header name {name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| OpenAIError::Config(format!("invalid header value: {e}")))?;
        self.extra_headers.insert(name, value);
        Ok(self)
    }

    /// Send one completion request and return the first choice.
    ///
    /// Non-success statuses are classified into typed errors carrying the
    /// provider's message.
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .headers(self.extra_headers.clone())
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, base_url = %self.base_url, "Chat completion request failed");
                OpenAIError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Chat completion API error");
            return Err(OpenAIError::from_status(status.as_u16(), &error_text));
        }

        let completion: types::RawCompletion = response
            .json()
            .await
            .map_err(|e| OpenAIError::Parse(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| OpenAIError::Parse("response contained no message content".into()))?;

        let usage = completion.usage.unwrap_or_default();
        debug!(
            model = %request.model,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            duration_ms = start.elapsed().as_millis() as u64,
            "Chat completion"
        );

        Ok(ChatResponse {
            content,
            usage: completion.usage,
        })
    }
}
