//! Pipeline entry point: extract, classify, render, verify.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::classify::{classify_links, ClassificationSource};
use super::context::extract_unique;
use super::verify::VerificationEngine;
use crate::error::{Result, VerifierError};
use crate::fetchers::{ContentFetcher, ProxyFetcher};
use crate::providers::{build_providers, ProviderChain};
use crate::traits::fetcher::PageFetcher;
use crate::traits::provider::ChatProvider;
use crate::traits::renderer::Renderer;
use crate::types::config::{ProviderConfig, VerifierConfig};
use crate::types::link::{Link, LinkStatus, VerificationResult};

/// Runs the full link check over one markdown document.
///
/// # Example
///
/// ```rust,ignore
/// use link_verifier::{LinkVerifier, ProviderConfig, VerifierConfig, NullRenderer};
/// use tokio_util::sync::CancellationToken;
///
/// let verifier = LinkVerifier::from_config(
///     VerifierConfig::default(),
///     &[ProviderConfig::openai(api_key)],
///     "http://localhost:8787/api/fetch",
/// )?;
/// let report = verifier.run(&markdown, &NullRenderer, &CancellationToken::new()).await?;
/// println!("{}", report.summary());
/// ```
pub struct LinkVerifier {
    config: VerifierConfig,
    provider: ProviderChain,
    fetcher: ContentFetcher,
}

impl LinkVerifier {
    /// Providers are tried in the given order. Fails when none can serve
    /// requests.
    pub fn new(
        config: VerifierConfig,
        providers: Vec<Arc<dyn ChatProvider>>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Self> {
        let provider = ProviderChain::new(providers)?;
        if !provider.is_available() {
            return Err(VerifierError::Config(
                "no LLM provider has credentials".into(),
            ));
        }

        let fetcher = ContentFetcher::new(fetcher, &config);
        Ok(Self {
            config,
            provider,
            fetcher,
        })
    }

    /// Build providers from config and fetch through the proxy at `proxy_url`.
    pub fn from_config(
        config: VerifierConfig,
        providers: &[ProviderConfig],
        proxy_url: &str,
    ) -> Result<Self> {
        let providers = build_providers(providers)?;
        let fetcher = ProxyFetcher::new(proxy_url)?;
        Self::new(config, providers, Arc::new(fetcher))
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Extract and classify without fetching anything.
    pub async fn classify(&self, markdown: &str) -> Vec<Link> {
        let mut links = extract_unique(markdown);
        classify_links(&mut links, &self.provider, &self.config).await;
        links
    }

    /// Run the whole pipeline. Only cancellation can fail a started run.
    pub async fn run(
        &self,
        markdown: &str,
        renderer: &dyn Renderer,
        cancel: &CancellationToken,
    ) -> Result<RunReport> {
        let started_at = Utc::now();

        let mut links = extract_unique(markdown);
        info!(links = links.len(), "Extracted unique links");

        if cancel.is_cancelled() {
            return Err(VerifierError::Cancelled);
        }

        let classification = classify_links(&mut links, &self.provider, &self.config).await;
        renderer.render(&links);

        let engine = VerificationEngine::new(&self.provider, &self.fetcher, &self.config);
        let results = engine.run(&links, renderer, cancel).await?;

        for (link, result) in links.iter_mut().zip(&results) {
            link.apply(result);
        }

        let report = RunReport {
            links,
            results,
            classification,
            started_at,
            finished_at: Utc::now(),
        };

        let summary = report.summary();
        info!(
            total = summary.total,
            verified = summary.verified,
            invalid = summary.invalid,
            inaccurate = summary.inaccurate,
            duration_ms = (report.finished_at - report.started_at).num_milliseconds(),
            "Link check complete"
        );

        Ok(report)
    }
}

/// Outcome of one run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Links with their final status applied
    pub links: Vec<Link>,
    /// Terminal result per link, in link order
    pub results: Vec<VerificationResult>,
    pub classification: ClassificationSource,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn summary(&self) -> RunSummary {
        let count = |status: LinkStatus| self.results.iter().filter(|r| r.status == status).count();
        let citations = self.links.iter().filter(|l| l.is_citation).count();

        RunSummary {
            total: self.results.len(),
            verified: count(LinkStatus::Verified),
            invalid: count(LinkStatus::Invalid),
            inaccurate: count(LinkStatus::Inaccurate),
            citations,
            regular: self.links.len() - citations,
        }
    }
}

/// Status counts for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub verified: usize,
    pub invalid: usize,
    pub inaccurate: usize,
    pub citations: usize,
    pub regular: usize,
}

impl RunSummary {
    /// Any link ended broken or unsupported.
    pub fn has_failures(&self) -> bool {
        self.invalid + self.inaccurate > 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} links ({} citations, {} regular): {} verified, {} invalid, {} inaccurate",
            self.total,
            self.citations,
            self.regular,
            self.verified,
            self.invalid,
            self.inaccurate
        )
    }
}
