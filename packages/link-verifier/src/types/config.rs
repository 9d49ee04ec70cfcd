//! Pipeline and provider configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

use secrecy::{ExposeSecret, SecretString};

/// Default model for both classification and verification.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default OpenRouter model (free tier).
pub const DEFAULT_OPENROUTER_MODEL: &str = "meta-llama/llama-3.3-70b-instruct:free";

/// Configuration for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Links fetched concurrently per fetch-phase batch. Default: 10.
    pub fetch_batch_size: usize,

    /// Links verified concurrently per verify-phase batch. Default: 5.
    pub verify_batch_size: usize,

    /// Page text kept per link, in characters. Default: 3000.
    pub max_page_chars: usize,

    /// Outbound links kept per page. Default: 10.
    pub max_page_links: usize,

    /// Model requested for batch classification.
    pub classification_model: String,

    /// Model requested for relevance and citation checks.
    pub verification_model: String,

    /// Sampling temperature for every call. Default: 0.0.
    pub temperature: f32,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            fetch_batch_size: 10,
            verify_batch_size: 5,
            max_page_chars: 3000,
            max_page_links: 10,
            classification_model: DEFAULT_MODEL.to_string(),
            verification_model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
        }
    }
}

impl VerifierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use one model for every call.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.classification_model = model.clone();
        self.verification_model = model;
        self
    }

    pub fn with_batch_sizes(mut self, fetch: usize, verify: usize) -> Self {
        self.fetch_batch_size = fetch;
        self.verify_batch_size = verify;
        self
    }

    pub fn with_page_limits(mut self, max_chars: usize, max_links: usize) -> Self {
        self.max_page_chars = max_chars;
        self.max_page_links = max_links;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// One LLM provider strategy, in priority order within a list.
#[derive(Clone)]
pub enum ProviderConfig {
    /// OpenAI (or any endpoint with OpenAI structured-output support)
    OpenAI {
        api_key: SecretString,
        /// Overrides the model named in [`VerifierConfig`]
        model: Option<String>,
        base_url: Option<String>,
    },

    /// OpenRouter free-tier fallback
    OpenRouter {
        api_key: SecretString,
        model: String,
        /// Sent as `HTTP-Referer` for OpenRouter attribution
        referer: Option<String>,
    },
}

impl ProviderConfig {
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::OpenAI {
            api_key: SecretString::from(api_key.into()),
            model: None,
            base_url: None,
        }
    }

    pub fn openrouter(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::OpenRouter {
            api_key: SecretString::from(api_key.into()),
            model: model.into(),
            referer: None,
        }
    }

    pub fn api_key(&self) -> &SecretString {
        match self {
            Self::OpenAI { api_key, .. } | Self::OpenRouter { api_key, .. } => api_key,
        }
    }

    /// Blank keys count as missing.
    pub fn has_key(&self) -> bool {
        !self.api_key().expose_secret().trim().is_empty()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAI { .. } => "openai",
            Self::OpenRouter { .. } => "openrouter",
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAI {
                model, base_url, ..
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"[REDACTED]")
                .field("model", model)
                .field("base_url", base_url)
                .finish(),
            Self::OpenRouter { model, referer, .. } => f
                .debug_struct("OpenRouter")
                .field("api_key", &"[REDACTED]")
                .field("model", model)
                .field("referer", referer)
                .finish(),
        }
    }
}
