use anyhow::{Context, Result};
use openai_client::OPENAI_BASE_URL;
use secrecy::SecretString;
use std::env;
use std::time::Duration;

/// Proxy configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub port: u16,
    /// Without a key `POST /api/chat` answers 503
    pub openai_api_key: Option<SecretString>,
    pub openai_base_url: String,
    pub fetch_timeout: Duration,
    pub max_text_chars: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            port: 8787,
            openai_api_key: None,
            openai_base_url: OPENAI_BASE_URL.to_string(),
            fetch_timeout: Duration::from_secs(10),
            max_text_chars: 5000,
        }
    }
}

impl ProxyConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()
                .context("PORT must be a valid number")?,
            openai_api_key: env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty())
                .map(SecretString::from),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or(defaults.openai_base_url),
            fetch_timeout: env::var("FETCH_TIMEOUT_SECS")
                .map(|secs| secs.parse().map(Duration::from_secs))
                .unwrap_or(Ok(defaults.fetch_timeout))
                .context("FETCH_TIMEOUT_SECS must be a whole number of seconds")?,
            max_text_chars: env::var("MAX_TEXT_CHARS")
                .unwrap_or_else(|_| defaults.max_text_chars.to_string())
                .parse()
                .context("MAX_TEXT_CHARS must be a valid number")?,
        })
    }

    pub fn with_openai_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(SecretString::from(key.into()));
        self
    }

    pub fn with_openai_base_url(mut self, url: impl Into<String>) -> Self {
        self.openai_base_url = url.into();
        self
    }
}
