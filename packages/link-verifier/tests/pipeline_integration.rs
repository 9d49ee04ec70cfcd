//! End-to-end pipeline runs against mock providers and fetchers.

use std::sync::Arc;

use link_verifier::testing::{EventLog, MockFetcher, MockProvider, RecordingRenderer};
use link_verifier::{
    ChatProvider, LinkStatus, LinkVerifier, Renderer, VerificationResult, VerifierConfig,
    VerifierError,
};
use openai_client::OpenAIError;
use tokio_util::sync::CancellationToken;

const STUDY: &str = "According to a [study](https://example.com/study) 81% of users agreed.";

fn verifier(provider: MockProvider, fetcher: MockFetcher) -> LinkVerifier {
    let providers: Vec<Arc<dyn ChatProvider>> = vec![Arc::new(provider)];
    LinkVerifier::new(VerifierConfig::default(), providers, Arc::new(fetcher)).unwrap()
}

fn many_links(count: usize) -> String {
    (0..count)
        .map(|i| format!("See the [docs](https://docs.example.com/guide/{i}) for setup."))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[tokio::test]
async fn test_study_citation_verified_end_to_end() {
    let provider = MockProvider::new()
        .on_schema(
            "ClassificationResponse",
            r#"{"classifications":[{"index":0,"isCitation":true}]}"#,
        )
        .on_schema(
            "CitationCheck",
            r#"{"isCorrect":true,"reasoning":"The survey reports the same share.","exactQuote":"81% of users agreed","suggestedUrl":null}"#,
        );
    let fetcher = MockFetcher::new().with_page(
        "https://example.com/study",
        "Survey findings. In total, 81% of users agreed with the proposal.",
    );
    let renderer = RecordingRenderer::new();

    let report = verifier(provider, fetcher)
        .run(STUDY, &renderer, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.results.len(), 1);
    let result = &report.results[0];
    assert!(result.is_citation);
    assert_eq!(result.status, LinkStatus::Verified);
    assert_eq!(result.exact_quote.as_deref(), Some("81% of users agreed"));
    assert_eq!(
        renderer.statuses_for(0),
        vec![LinkStatus::Fetching, LinkStatus::Checking, LinkStatus::Verified]
    );
}

#[tokio::test]
async fn test_study_classified_citation_without_model() {
    let provider = MockProvider::new().fail_with(|| OpenAIError::Network("offline".into()));
    let fetcher = MockFetcher::new().with_page("https://example.com/study", "81% of users agreed");

    let report = verifier(provider, fetcher)
        .run(STUDY, &RecordingRenderer::new(), &CancellationToken::new())
        .await
        .unwrap();

    assert!(report.links[0].is_citation);
    // model unreachable: the citation cannot be grounded
    assert_eq!(report.results[0].status, LinkStatus::Inaccurate);
    assert!(report.results[0]
        .analysis
        .as_deref()
        .unwrap()
        .contains("offline"));
}

#[tokio::test]
async fn test_batch_scheduling_for_23_links() {
    let log = EventLog::new();
    let provider = MockProvider::new()
        .on_schema("RelevanceCheck", r#"{"isRelevant":true,"reasoning":"Docs page."}"#);
    let fetcher = MockFetcher::new()
        .with_default_page("Setup documentation.")
        .with_log(log.clone());
    let renderer = RecordingRenderer::new().with_log(log.clone());

    let markdown = many_links(23);
    let report = verifier(provider, fetcher)
        .run(&markdown, &renderer, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.results.len(), 23);
    assert_eq!(log.batches(LinkStatus::Fetching), vec![10, 10, 3]);
    assert_eq!(log.batches(LinkStatus::Checking), vec![5, 5, 5, 5, 3]);

    for index in 0..23 {
        let statuses = renderer.statuses_for(index);
        assert_eq!(statuses.len(), 3, "link {index}");
        assert_eq!(statuses[0], LinkStatus::Fetching);
        assert_eq!(statuses[1], LinkStatus::Checking);
        assert!(statuses[2].is_terminal());
    }
}

#[tokio::test]
async fn test_broken_link_invalid_regardless_of_citation() {
    let markdown = "Prices rose [12% in March](https://stats.example.com/cpi). See [our homepage](https://example.com/gone).";
    let fetcher = MockFetcher::new()
        .with_status("https://stats.example.com/cpi", 404)
        .with_status("https://example.com/gone", 404);

    let report = verifier(MockProvider::new(), fetcher)
        .run(markdown, &RecordingRenderer::new(), &CancellationToken::new())
        .await
        .unwrap();

    assert!(report.results[0].is_citation);
    assert!(!report.results[1].is_citation);
    for result in &report.results {
        assert_eq!(result.status, LinkStatus::Invalid);
        let analysis = result.analysis.as_deref().unwrap();
        assert!(analysis.contains("404"));
        assert!(analysis.contains("Not Found"));
    }
}

#[tokio::test]
async fn test_unquoted_claim_marked_for_recheck() {
    let provider = MockProvider::new()
        .on_schema(
            "ClassificationResponse",
            r#"{"classifications":[{"index":0,"isCitation":true}]}"#,
        )
        .on_schema(
            "CitationCheck",
            r#"{"isCorrect":true,"reasoning":"Close enough.","exactQuote":"Sales rose 79% last year.","suggestedUrl":null}"#,
        );
    let fetcher =
        MockFetcher::new().with_page("https://example.com/q4", "Sales rose 70% last year.");

    let report = verifier(provider, fetcher)
        .run(
            "Sales rose 79% last year, per the [Q4 report](https://example.com/q4).",
            &RecordingRenderer::new(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let result = &report.results[0];
    assert_eq!(result.status, LinkStatus::Inaccurate);
    assert!(result
        .analysis
        .as_deref()
        .unwrap()
        .starts_with("Marked as Recheck:"));
}

#[tokio::test]
async fn test_fetch_panic_contained_to_one_link() {
    let provider = MockProvider::new()
        .on_schema("RelevanceCheck", r#"{"isRelevant":true,"reasoning":"ok"}"#);
    let fetcher = MockFetcher::new()
        .with_page("https://a.example.com", "Alpha")
        .panic_on("https://b.example.com")
        .with_page("https://c.example.com", "Gamma");

    let report = verifier(provider, fetcher)
        .run(
            "Try [alpha](https://a.example.com).\n\nTry [beta](https://b.example.com).\n\nTry [gamma](https://c.example.com).",
            &RecordingRenderer::new(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let statuses: Vec<LinkStatus> = report.results.iter().map(|r| r.status).collect();
    assert_eq!(statuses, vec![LinkStatus::Verified; 3]);
    assert!(report.results[1]
        .analysis
        .as_deref()
        .unwrap()
        .starts_with("Verification error:"));
}

#[tokio::test]
async fn test_proxy_outage_keeps_regular_links_verified() {
    let fetcher = MockFetcher::new().with_error("https://example.com", "proxy unreachable");

    let report = verifier(MockProvider::new(), fetcher)
        .run(
            "Download it from [our homepage](https://example.com).",
            &RecordingRenderer::new(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let result = &report.results[0];
    assert_eq!(result.status, LinkStatus::Verified);
    assert!(result
        .analysis
        .as_deref()
        .unwrap()
        .contains("status could not be confirmed"));
}

#[tokio::test]
async fn test_second_provider_used_when_first_fails() {
    let primary = Arc::new(
        MockProvider::new().fail_with(|| OpenAIError::Unauthorized("invalid api key".into())),
    );
    let fallback = Arc::new(MockProvider::new().on_schema(
        "CitationCheck",
        r#"{"isCorrect":true,"reasoning":"Stated.","exactQuote":"81% of users agreed","suggestedUrl":null}"#,
    ));
    let providers: Vec<Arc<dyn ChatProvider>> = vec![primary.clone(), fallback.clone()];
    let fetcher = MockFetcher::new().with_page("https://example.com/study", "81% of users agreed.");

    let report = LinkVerifier::new(VerifierConfig::default(), providers, Arc::new(fetcher))
        .unwrap()
        .run(STUDY, &RecordingRenderer::new(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.results[0].status, LinkStatus::Verified);
    assert_eq!(fallback.calls_for("CitationCheck"), 1);
    assert_eq!(primary.calls_for("CitationCheck"), 1);
}

#[test]
fn test_missing_credentials_fail_before_run() {
    let result = LinkVerifier::from_config(
        VerifierConfig::default(),
        &[],
        link_verifier::DEFAULT_PROXY_URL,
    );
    assert!(matches!(result, Err(VerifierError::Config(_))));
}

/// Cancels the run once the first verify batch starts.
struct CancelOnCheck {
    inner: RecordingRenderer,
    cancel: CancellationToken,
}

impl Renderer for CancelOnCheck {
    fn render(&self, links: &[link_verifier::Link]) {
        self.inner.render(links);
    }

    fn update(&self, index: usize, result: &VerificationResult) {
        if result.status == LinkStatus::Checking {
            self.cancel.cancel();
        }
        self.inner.update(index, result);
    }
}

#[tokio::test]
async fn test_cancellation_at_batch_boundary() {
    let provider = MockProvider::new()
        .on_schema("RelevanceCheck", r#"{"isRelevant":true,"reasoning":"ok"}"#);
    let fetcher = MockFetcher::new().with_default_page("Docs.");
    let cancel = CancellationToken::new();
    let renderer = CancelOnCheck {
        inner: RecordingRenderer::new(),
        cancel: cancel.clone(),
    };

    let result = verifier(provider, fetcher)
        .run(&many_links(7), &renderer, &cancel)
        .await;

    assert!(matches!(result, Err(VerifierError::Cancelled)));
    // first verify batch completed, second never started
    assert_eq!(renderer.inner.log().batches(LinkStatus::Checking), vec![5]);
    assert!(renderer.inner.statuses_for(6).iter().all(|s| *s != LinkStatus::Checking));
}
