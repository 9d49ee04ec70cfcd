//! LLM provider strategies.

pub mod chain;
pub mod openai;
pub mod openrouter;

pub use chain::ProviderChain;
pub use openai::OpenAIProvider;
pub use openrouter::{OpenRouterProvider, OPENROUTER_BASE_URL};

use openai_client::{json_payload, StructuredOutput};
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, VerifierError};
use crate::traits::provider::{ChatProvider, JsonRequest};
use crate::types::config::ProviderConfig;

/// Build provider strategies from config, in the given order.
///
/// Entries with blank keys are dropped; if nothing remains the result is a
/// configuration error.
pub fn build_providers(configs: &[ProviderConfig]) -> Result<Vec<Arc<dyn ChatProvider>>> {
    let mut providers: Vec<Arc<dyn ChatProvider>> = Vec::new();

    for config in configs {
        if !config.has_key() {
            debug!(provider = config.name(), "Skipping provider without API key");
            continue;
        }

        match config {
            ProviderConfig::OpenAI {
                api_key,
                model,
                base_url,
            } => {
                let mut provider = OpenAIProvider::new(api_key.clone()).with_model(model.clone());
                if let Some(url) = base_url {
                    provider = provider.with_base_url(url);
                }
                providers.push(Arc::new(provider));
            }
            ProviderConfig::OpenRouter {
                api_key,
                model,
                referer,
            } => {
                let provider =
                    OpenRouterProvider::new(api_key.clone(), model, referer.as_deref())
                        .map_err(|e| VerifierError::Config(e.to_string()))?;
                providers.push(Arc::new(provider));
            }
        }
    }

    if providers.is_empty() {
        return Err(VerifierError::Config(
            "no LLM provider credentials configured".into(),
        ));
    }

    Ok(providers)
}

/// Ask a provider for a typed JSON reply.
///
/// The schema is generated from `T`; a reply that does not deserialize into
/// `T` is a parse error.
pub async fn complete_structured<T: StructuredOutput>(
    provider: &dyn ChatProvider,
    model: &str,
    system: &str,
    user: String,
    temperature: f32,
) -> Result<T> {
    let request = JsonRequest {
        model: model.to_string(),
        system: system.to_string(),
        user,
        temperature,
        schema_name: T::type_name(),
        schema: T::openai_schema(),
    };

    let raw = provider.complete_json(&request).await?;

    serde_json::from_str(json_payload(&raw)).map_err(|e| {
        VerifierError::Parse(format!("{} did not match schema: {}", request.schema_name, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_keys_are_config_error() {
        let configs = vec![ProviderConfig::openai(""), ProviderConfig::openrouter("  ", "m")];
        assert!(matches!(build_providers(&configs), Err(VerifierError::Config(_))));
    }

    #[test]
    fn test_providers_keep_order() {
        let configs = vec![
            ProviderConfig::openrouter("or-key", "meta-llama/llama-3.3-70b-instruct:free"),
            ProviderConfig::openai("sk-key"),
        ];
        let providers = build_providers(&configs).unwrap();
        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["openrouter", "openai"]);
    }
}
