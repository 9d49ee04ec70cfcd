//! Error types for the chat completion client.

use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, OpenAIError>;

/// Chat completion client errors.
#[derive(Debug, Error)]
pub enum OpenAIError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// 401 from the provider: the credential was rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 404 from the provider: usually an unknown model identifier
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// 429 from the provider
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// 5xx from the provider
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Any other non-success response
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl OpenAIError {
    /// Classify a non-success HTTP response.
    ///
    /// `body` is the raw response text; when it carries the usual
    /// `{"error": {"message": ...}}` envelope the provider message is used.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = provider_message(body);
        match status {
            401 => Self::Unauthorized(message),
            404 => Self::ModelNotFound(message),
            429 => Self::RateLimited(message),
            500..=599 => Self::Server { status, message },
            _ => Self::Api { status, message },
        }
    }

    /// Whether another provider is worth trying after this error.
    pub fn is_retryable_elsewhere(&self) -> bool {
        !matches!(self, Self::Config(_))
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::ModelNotFound(_) => Some(404),
            Self::RateLimited(_) => Some(429),
            Self::Server { status, .. } | Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn provider_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|v| {
        v["error"]["message"]
            .as_str()
            .or_else(|| v["error"].as_str())
            .or_else(|| v["message"].as_str())
            .map(str::to_string)
    });

    match message {
        Some(m) if !m.is_empty() => m,
        _ if body.trim().is_empty() => "empty response body".to_string(),
        _ => body.trim().to_string(),
    }
}
