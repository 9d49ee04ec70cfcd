use link_verifier::{ProviderConfig, DEFAULT_OPENROUTER_MODEL, DEFAULT_PROXY_URL};
use std::env;

/// Credentials and endpoints read from the environment. Command-line
/// flags override these per command. Not `Debug`: it holds raw keys.
#[derive(Clone, Default)]
pub struct Settings {
    pub openai_api_key: Option<String>,
    pub openai_model: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub openrouter_model: Option<String>,
    pub proxy_url: Option<String>,
}

impl Settings {
    /// Load settings from environment variables (after `.env` is applied)
    pub fn from_env() -> Self {
        Self {
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
            openai_model: non_empty_var("OPENAI_MODEL"),
            openrouter_api_key: non_empty_var("OPENROUTER_API_KEY"),
            openrouter_model: non_empty_var("OPENROUTER_MODEL"),
            proxy_url: non_empty_var("LINK_PROXY_URL"),
        }
    }

    pub fn proxy_url(&self) -> &str {
        self.proxy_url.as_deref().unwrap_or(DEFAULT_PROXY_URL)
    }

    /// Providers in priority order: OpenAI first, OpenRouter as fallback.
    pub fn providers(&self) -> Vec<ProviderConfig> {
        let mut providers = Vec::new();

        if let Some(key) = &self.openai_api_key {
            providers.push(ProviderConfig::openai(key.as_str()));
        }
        if let Some(key) = &self.openrouter_api_key {
            let model = self
                .openrouter_model
                .as_deref()
                .unwrap_or(DEFAULT_OPENROUTER_MODEL);
            providers.push(ProviderConfig::openrouter(key.as_str(), model));
        }

        providers
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
