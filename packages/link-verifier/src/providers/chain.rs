//! Prioritized provider list.

use async_trait::async_trait;
use openai_client::OpenAIError;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{Result, VerifierError};
use crate::traits::provider::{ChatProvider, JsonRequest};

/// Tries each provider in order and returns the first success.
///
/// Providers without credentials are skipped. Errors that another provider
/// could avoid (auth, unknown model, rate limit, server, network, parse)
/// advance to the next one; the last error is returned when all fail.
#[derive(Clone)]
pub struct ProviderChain {
    providers: Vec<Arc<dyn ChatProvider>>,
}

impl std::fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.providers.iter().map(|p| p.name()).collect();
        f.debug_struct("ProviderChain").field("providers", &names).finish()
    }
}

impl ProviderChain {
    /// An empty list is a configuration error.
    pub fn new(providers: Vec<Arc<dyn ChatProvider>>) -> Result<Self> {
        if providers.is_empty() {
            return Err(VerifierError::Config(
                "no LLM provider configured (set OPENAI_API_KEY or OPENROUTER_API_KEY)".into(),
            ));
        }
        Ok(Self { providers })
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[async_trait]
impl ChatProvider for ProviderChain {
    fn name(&self) -> &str {
        "chain"
    }

    async fn complete_json(&self, request: &JsonRequest) -> std::result::Result<String, OpenAIError> {
        let mut last_error = None;

        for provider in self.providers.iter().filter(|p| p.is_available()) {
            match provider.complete_json(request).await {
                Ok(content) => {
                    debug!(provider = provider.name(), "Provider answered");
                    return Ok(content);
                }
                Err(e) if e.is_retryable_elsewhere() => {
                    warn!(provider = provider.name(), error = %e, "Provider failed, trying next");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| OpenAIError::Config("no provider has credentials".into())))
    }

    fn is_available(&self) -> bool {
        self.providers.iter().any(|p| p.is_available())
    }
}
