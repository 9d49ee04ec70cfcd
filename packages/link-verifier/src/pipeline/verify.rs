//! Verification engine: fetch phase, then verify phase.
//!
//! Both phases run fixed-size batches. Links within a batch run
//! concurrently; a batch finishes completely before the next one starts.
//! Every link ends in a terminal, explained status. Per-link errors and
//! panics are contained to that link.

use futures::future::join_all;
use futures::FutureExt;
use schemars::JsonSchema;
use serde::Deserialize;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::grounding::check_grounding;
use super::prompts::{
    citation_prompt, relevance_prompt, CITATION_SYSTEM_PROMPT, RELEVANCE_SYSTEM_PROMPT,
};
use crate::error::{Result, VerifierError};
use crate::fetchers::ContentFetcher;
use crate::providers::complete_structured;
use crate::traits::provider::ChatProvider;
use crate::traits::renderer::Renderer;
use crate::types::config::VerifierConfig;
use crate::types::link::{Link, LinkStatus, VerificationResult};
use crate::types::page::{FetchedData, HttpStatus, PageContent};

/// Model response for the regular-link relevance check.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelevanceCheck {
    /// Whether the anchor text matches the page topic
    pub is_relevant: bool,
    pub reasoning: String,
}

/// Model response for the citation fact check.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CitationCheck {
    /// Whether the page supports the claim
    pub is_correct: bool,
    pub reasoning: String,
    /// Verbatim passage from the page supporting the claim
    #[serde(default)]
    pub exact_quote: Option<String>,
    /// Better source (primary source or a page that supports the claim)
    #[serde(default)]
    pub suggested_url: Option<String>,
}

pub struct VerificationEngine<'a> {
    provider: &'a dyn ChatProvider,
    fetcher: &'a ContentFetcher,
    config: &'a VerifierConfig,
}

impl<'a> VerificationEngine<'a> {
    pub fn new(
        provider: &'a dyn ChatProvider,
        fetcher: &'a ContentFetcher,
        config: &'a VerifierConfig,
    ) -> Self {
        Self {
            provider,
            fetcher,
            config,
        }
    }

    /// Run both phases. Results are returned in link order.
    pub async fn run(
        &self,
        links: &[Link],
        renderer: &dyn Renderer,
        cancel: &CancellationToken,
    ) -> Result<Vec<VerificationResult>> {
        let fetched = self.fetch_phase(links, renderer, cancel).await?;
        self.verify_phase(links, &fetched, renderer, cancel).await
    }

    async fn fetch_phase(
        &self,
        links: &[Link],
        renderer: &dyn Renderer,
        cancel: &CancellationToken,
    ) -> Result<Vec<Option<FetchedData>>> {
        let mut fetched: Vec<Option<FetchedData>> = vec![None; links.len()];
        let indices: Vec<usize> = (0..links.len()).collect();

        for (batch, chunk) in indices.chunks(self.config.fetch_batch_size.max(1)).enumerate() {
            if cancel.is_cancelled() {
                return Err(VerifierError::Cancelled);
            }

            info!(phase = "fetch", batch, size = chunk.len(), "Starting batch");
            for &i in chunk {
                renderer.update(i, &VerificationResult::progress(&links[i], LinkStatus::Fetching));
            }

            let outcomes = join_all(chunk.iter().map(|&i| self.fetch_one(&links[i]))).await;
            for (&i, data) in chunk.iter().zip(outcomes) {
                fetched[i] = Some(data);
            }
        }

        Ok(fetched)
    }

    async fn verify_phase(
        &self,
        links: &[Link],
        fetched: &[Option<FetchedData>],
        renderer: &dyn Renderer,
        cancel: &CancellationToken,
    ) -> Result<Vec<VerificationResult>> {
        let mut results: Vec<VerificationResult> = links
            .iter()
            .map(|link| VerificationResult::progress(link, LinkStatus::Pending))
            .collect();
        let indices: Vec<usize> = (0..links.len()).collect();

        for (batch, chunk) in indices.chunks(self.config.verify_batch_size.max(1)).enumerate() {
            if cancel.is_cancelled() {
                return Err(VerifierError::Cancelled);
            }

            info!(phase = "verify", batch, size = chunk.len(), "Starting batch");
            for &i in chunk {
                renderer.update(i, &VerificationResult::progress(&links[i], LinkStatus::Checking));
            }

            let outcomes = join_all(chunk.iter().map(|&i| async move {
                let result = self.verify_one(&links[i], fetched[i].as_ref()).await;
                renderer.update(i, &result);
                result
            }))
            .await;

            for (&i, result) in chunk.iter().zip(outcomes) {
                results[i] = result;
            }
        }

        Ok(results)
    }

    async fn fetch_one(&self, link: &Link) -> FetchedData {
        match AssertUnwindSafe(self.fetcher.fetch(&link.url))
            .catch_unwind()
            .await
        {
            Ok(data) => data,
            Err(panic) => {
                let message = panic_message(panic);
                warn!(url = %link.url, error = %message, "Fetch panicked");
                FetchedData::faulted(message)
            }
        }
    }

    async fn verify_one(&self, link: &Link, data: Option<&FetchedData>) -> VerificationResult {
        let start = Instant::now();

        let data = match data {
            Some(data) => data,
            None => return fault_result(link, "link was not fetched"),
        };
        if let Some(fault) = &data.fault {
            return fault_result(link, fault);
        }

        let outcome = AssertUnwindSafe(self.verify_link(link, data))
            .catch_unwind()
            .await;

        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!(url = %link.url, error = %e, "Verification failed");
                fault_result(link, &e.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic);
                warn!(url = %link.url, error = %message, "Verification panicked");
                fault_result(link, &message)
            }
        };

        debug!(
            url = %link.url,
            status = %result.status,
            duration_ms = start.elapsed().as_millis() as u64,
            "Link verified"
        );
        result
    }

    async fn verify_link(&self, link: &Link, data: &FetchedData) -> Result<VerificationResult> {
        if !data.http_status.ok {
            return Ok(VerificationResult::terminal(
                link,
                LinkStatus::Invalid,
                format!("Link is broken: {}", data.http_status.describe()),
            ));
        }

        if link.is_citation {
            self.verify_citation(link, data).await
        } else {
            Ok(self.verify_regular(link, data).await)
        }
    }

    /// Regular links end `verified`; relevance only shapes the analysis.
    async fn verify_regular(&self, link: &Link, data: &FetchedData) -> VerificationResult {
        let status = &data.http_status;

        let analysis = match &data.page_content {
            None => {
                if status.code.is_some() {
                    "Link is working.".to_string()
                } else {
                    "Link is working (status could not be confirmed).".to_string()
                }
            }
            Some(page) => match self.check_relevance(link, page).await {
                Ok(check) if check.is_relevant => {
                    format!("Link is working and relevant. {}", check.reasoning)
                }
                Ok(check) => format!(
                    "Link is working, but the anchor text may not match the page. {}",
                    check.reasoning
                ),
                Err(e) => {
                    warn!(url = %link.url, error = %e, "Relevance check failed");
                    "Link is working; relevance could not be verified.".to_string()
                }
            },
        };

        VerificationResult::terminal(link, LinkStatus::Verified, with_redirect_note(analysis, status))
            .with_redirect(status.redirect_url.clone())
    }

    /// Citations need page text and a grounded quote to end `verified`.
    async fn verify_citation(&self, link: &Link, data: &FetchedData) -> Result<VerificationResult> {
        let status = &data.http_status;

        let Some(page) = &data.page_content else {
            warn!(url = %link.url, "Citation content unavailable");
            let analysis = "Marked as Recheck: Content unavailable, the claim could not be checked against the source.";
            return Ok(VerificationResult::terminal(
                link,
                LinkStatus::Inaccurate,
                with_redirect_note(analysis.to_string(), status),
            )
            .with_redirect(status.redirect_url.clone()));
        };

        let check = self.check_citation(link, page).await?;
        let suggested = check
            .suggested_url
            .filter(|url| url.starts_with("http") && url != &link.url);

        let result = if check.is_correct {
            match check_grounding(check.exact_quote.as_deref(), &page.text, &link.context) {
                Ok(quote) => VerificationResult::terminal(
                    link,
                    LinkStatus::Verified,
                    with_redirect_note(format!("Quote: \"{}\". {}", quote, check.reasoning), status),
                )
                .with_quote(quote),
                Err(failure) => {
                    warn!(url = %link.url, reason = %failure, "Grounding check failed");
                    VerificationResult::terminal(
                        link,
                        LinkStatus::Inaccurate,
                        with_redirect_note(
                            format!(
                                "Marked as Recheck: {}. Model reasoning: {}",
                                failure, check.reasoning
                            ),
                            status,
                        ),
                    )
                    .with_suggested_url(suggested)
                }
            }
        } else {
            VerificationResult::terminal(
                link,
                LinkStatus::Inaccurate,
                with_redirect_note(check.reasoning, status),
            )
            .with_suggested_url(suggested)
        };

        Ok(result.with_redirect(status.redirect_url.clone()))
    }

    async fn check_relevance(&self, link: &Link, page: &PageContent) -> Result<RelevanceCheck> {
        complete_structured(
            self.provider,
            &self.config.verification_model,
            RELEVANCE_SYSTEM_PROMPT,
            relevance_prompt(link, page),
            self.config.temperature,
        )
        .await
    }

    async fn check_citation(&self, link: &Link, page: &PageContent) -> Result<CitationCheck> {
        complete_structured(
            self.provider,
            &self.config.verification_model,
            CITATION_SYSTEM_PROMPT,
            citation_prompt(link, page, self.config.max_page_links),
            self.config.temperature,
        )
        .await
    }
}

fn with_redirect_note(mut analysis: String, status: &HttpStatus) -> String {
    if let Some(url) = &status.redirect_url {
        analysis.push_str(&format!(" Redirects to {}.", url));
    }
    analysis
}

/// Error or panic while handling one link.
fn fault_result(link: &Link, message: &str) -> VerificationResult {
    let status = if link.is_citation {
        LinkStatus::Inaccurate
    } else {
        LinkStatus::Verified
    };
    VerificationResult::terminal(link, status, format!("Verification error: {}", message))
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockFetcher, MockProvider, RecordingRenderer};
    use std::sync::Arc;

    fn citation(text: &str, url: &str, context: &str) -> Link {
        Link::new(text, url).with_context(context).with_citation(true)
    }

    async fn run_one(link: Link, provider: MockProvider, fetcher: MockFetcher) -> VerificationResult {
        let config = VerifierConfig::default();
        let content = ContentFetcher::new(Arc::new(fetcher), &config);
        let engine = VerificationEngine::new(&provider, &content, &config);
        let renderer = RecordingRenderer::new();

        engine
            .run(&[link], &renderer, &CancellationToken::new())
            .await
            .unwrap()
            .remove(0)
    }

    #[tokio::test]
    async fn test_citation_verified_with_quote() {
        let provider = MockProvider::new().on_schema(
            "CitationCheck",
            r#"{"isCorrect":true,"reasoning":"The page states it.","exactQuote":"81% of users agreed","suggestedUrl":null}"#,
        );
        let fetcher = MockFetcher::new().with_page("https://a.com/study", "Survey results: 81% of users agreed.");

        let result = run_one(
            citation("study", "https://a.com/study", "According to a study 81% of users agreed."),
            provider,
            fetcher,
        )
        .await;

        assert_eq!(result.status, LinkStatus::Verified);
        assert_eq!(result.exact_quote.as_deref(), Some("81% of users agreed"));
        assert!(result.analysis.unwrap().starts_with("Quote: \"81% of users agreed\""));
    }

    #[tokio::test]
    async fn test_grounding_failure_demotes() {
        let provider = MockProvider::new().on_schema(
            "CitationCheck",
            r#"{"isCorrect":true,"reasoning":"Matches.","exactQuote":"Sales rose 80% last year.","suggestedUrl":null}"#,
        );
        let fetcher = MockFetcher::new().with_page("https://a.com", "Sales rose 79% last year.");

        let result = run_one(
            citation("report", "https://a.com", "Sales rose 80% last year."),
            provider,
            fetcher,
        )
        .await;

        assert_eq!(result.status, LinkStatus::Inaccurate);
        assert!(result.analysis.unwrap().starts_with("Marked as Recheck:"));
        assert_eq!(result.exact_quote, None);
    }

    #[tokio::test]
    async fn test_model_rejection_keeps_suggestion() {
        let provider = MockProvider::new().on_schema(
            "CitationCheck",
            r#"{"isCorrect":false,"reasoning":"The page says 40%.","exactQuote":null,"suggestedUrl":"https://primary.org/data"}"#,
        );
        let fetcher = MockFetcher::new().with_page("https://a.com", "About 40% agreed.");

        let result = run_one(
            citation("poll", "https://a.com", "A poll found 60% agreed."),
            provider,
            fetcher,
        )
        .await;

        assert_eq!(result.status, LinkStatus::Inaccurate);
        assert_eq!(result.suggested_url.as_deref(), Some("https://primary.org/data"));
        assert_eq!(result.analysis.as_deref(), Some("The page says 40%."));
    }

    #[tokio::test]
    async fn test_citation_without_content_is_inaccurate() {
        let fetcher = MockFetcher::new().with_page("https://a.com", "   ");

        let result = run_one(
            citation("study", "https://a.com", "A study found 12%."),
            MockProvider::new(),
            fetcher,
        )
        .await;

        assert_eq!(result.status, LinkStatus::Inaccurate);
        assert!(result.analysis.unwrap().contains("Content unavailable"));
    }

    #[tokio::test]
    async fn test_broken_link_is_invalid() {
        let fetcher = MockFetcher::new().with_status("https://a.com/gone", 404);

        for is_citation in [true, false] {
            let link = Link::new("gone", "https://a.com/gone").with_citation(is_citation);
            let result = run_one(link, MockProvider::new(), fetcher.clone()).await;

            assert_eq!(result.status, LinkStatus::Invalid);
            let analysis = result.analysis.unwrap();
            assert!(analysis.contains("404"));
            assert!(analysis.contains("Not Found"));
        }
    }

    #[tokio::test]
    async fn test_regular_link_relevance_failure_still_verified() {
        let provider = MockProvider::new().fail_with(|| openai_client::OpenAIError::Network("down".into()));
        let fetcher = MockFetcher::new().with_page("https://docs.rs", "Docs for Rust crates.");

        let result = run_one(Link::new("docs", "https://docs.rs"), provider, fetcher).await;

        assert_eq!(result.status, LinkStatus::Verified);
        assert!(result.analysis.unwrap().contains("relevance could not be verified"));
    }

    #[tokio::test]
    async fn test_regular_link_redirect_noted() {
        let provider = MockProvider::new().on_schema(
            "RelevanceCheck",
            r#"{"isRelevant":true,"reasoning":"Same site."}"#,
        );
        let fetcher = MockFetcher::new()
            .with_page("https://old.com", "Welcome")
            .with_redirect("https://old.com", "https://new.com/");

        let result = run_one(Link::new("site", "https://old.com"), provider, fetcher).await;

        assert_eq!(result.status, LinkStatus::Verified);
        assert_eq!(result.redirect_url.as_deref(), Some("https://new.com/"));
        assert!(result.analysis.unwrap().contains("Redirects to https://new.com/"));
    }

    #[tokio::test]
    async fn test_provider_error_maps_by_citation() {
        let failing = || MockProvider::new().fail_with(|| openai_client::OpenAIError::Unauthorized("bad key".into()));
        let fetcher = MockFetcher::new().with_page("https://a.com", "Some 12% text.");

        let cited = run_one(citation("study", "https://a.com", "A study found 12%."), failing(), fetcher.clone()).await;
        assert_eq!(cited.status, LinkStatus::Inaccurate);
        assert!(cited.analysis.unwrap().contains("bad key"));
    }

    #[tokio::test]
    async fn test_panicking_provider_contained() {
        let provider = MockProvider::new().panic_on("CitationCheck");
        let fetcher = MockFetcher::new().with_page("https://a.com", "text 5%");

        let result = run_one(citation("s", "https://a.com", "Up 5%."), provider, fetcher).await;

        assert_eq!(result.status, LinkStatus::Inaccurate);
        assert!(result.analysis.unwrap().starts_with("Verification error:"));
    }

    #[tokio::test]
    async fn test_cancelled_before_first_batch() {
        let config = VerifierConfig::default();
        let content = ContentFetcher::new(Arc::new(MockFetcher::new()), &config);
        let provider = MockProvider::new();
        let engine = VerificationEngine::new(&provider, &content, &config);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = engine
            .run(&[Link::new("a", "https://a.com")], &RecordingRenderer::new(), &cancel)
            .await;

        assert!(matches!(result, Err(VerifierError::Cancelled)));
    }
}
