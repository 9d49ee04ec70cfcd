pub mod check;
pub mod classify;

use anyhow::{bail, Context, Result};
use clap::Args;
use link_verifier::{LinkVerifier, VerifierConfig};
use std::path::PathBuf;

use crate::config::Settings;

/// Input and provider options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Markdown file to check (reads stdin when omitted or `-`)
    pub input: Option<PathBuf>,

    /// Model for classification and verification (env: OPENAI_MODEL)
    #[arg(long)]
    pub model: Option<String>,

    /// OpenRouter fallback model (env: OPENROUTER_MODEL)
    #[arg(long)]
    pub openrouter_model: Option<String>,

    /// Fetch proxy endpoint (env: LINK_PROXY_URL)
    #[arg(long)]
    pub proxy_url: Option<String>,

    /// Emit JSON instead of the terminal table
    #[arg(long)]
    pub json: bool,
}

impl CommonArgs {
    /// Environment settings with command-line overrides applied.
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::from_env();
        if let Some(model) = &self.model {
            settings.openai_model = Some(model.clone());
        }
        if let Some(model) = &self.openrouter_model {
            settings.openrouter_model = Some(model.clone());
        }
        if let Some(url) = &self.proxy_url {
            settings.proxy_url = Some(url.clone());
        }
        settings
    }

    pub fn verifier(&self, config: VerifierConfig) -> Result<LinkVerifier> {
        let settings = self.settings();
        let providers = settings.providers();
        if providers.is_empty() {
            bail!("No API key configured. Set OPENAI_API_KEY or OPENROUTER_API_KEY.");
        }

        let config = match &settings.openai_model {
            Some(model) => config.with_model(model.as_str()),
            None => config,
        };

        LinkVerifier::from_config(config, &providers, settings.proxy_url())
            .context("Failed to set up the link verifier")
    }
}
