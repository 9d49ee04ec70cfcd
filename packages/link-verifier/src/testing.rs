//! Testing utilities.
//!
//! Mock providers, fetchers and renderers for exercising the pipeline
//! without network access.

use async_trait::async_trait;
use openai_client::OpenAIError;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{FetchedPage, PageFetcher};
use crate::traits::provider::{ChatProvider, JsonRequest};
use crate::traits::renderer::Renderer;
use crate::types::link::{Link, LinkStatus, VerificationResult};
use crate::types::page::PageLink;

/// Something observable that happened during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    Render { count: usize },
    Update { index: usize, status: LinkStatus },
    Fetch { url: String },
}

/// Ordered event log shared between mocks.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<RwLock<Vec<PipelineEvent>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: PipelineEvent) {
        self.0.write().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        self.0.read().unwrap().clone()
    }

    /// Sizes of runs of consecutive updates with the given status.
    ///
    /// With fetch calls logged between groups, this recovers batch sizes.
    pub fn batches(&self, status: LinkStatus) -> Vec<usize> {
        let mut sizes = Vec::new();
        let mut current = 0;

        for event in self.events() {
            match event {
                PipelineEvent::Update { status: s, .. } if s == status => current += 1,
                _ if current > 0 => {
                    sizes.push(current);
                    current = 0;
                }
                _ => {}
            }
        }
        if current > 0 {
            sizes.push(current);
        }
        sizes
    }
}

// =============================================================================
// MockProvider
// =============================================================================

/// Record of a call made to the mock provider.
#[derive(Debug, Clone)]
pub struct MockProviderCall {
    pub schema_name: String,
    pub model: String,
    pub user: String,
}

type FailureFn = Arc<dyn Fn() -> OpenAIError + Send + Sync>;

/// Mock LLM provider with canned JSON replies.
///
/// Replies are chosen by prompt marker (substring of the user prompt)
/// first, then by response schema name, then the default.
#[derive(Clone)]
pub struct MockProvider {
    name: String,
    prompt_rules: Arc<RwLock<Vec<(String, String)>>>,
    schema_rules: Arc<RwLock<HashMap<String, String>>>,
    default_reply: Option<String>,
    failure: Option<FailureFn>,
    panic_schema: Option<String>,
    available: bool,
    calls: Arc<RwLock<Vec<MockProviderCall>>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            prompt_rules: Arc::default(),
            schema_rules: Arc::default(),
            default_reply: None,
            failure: None,
            panic_schema: None,
            available: true,
            calls: Arc::default(),
        }
    }
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Reply for requests expecting the given response type.
    pub fn on_schema(self, schema_name: &str, reply: &str) -> Self {
        self.schema_rules
            .write()
            .unwrap()
            .insert(schema_name.to_string(), reply.to_string());
        self
    }

    /// Reply for requests whose user prompt contains `marker`.
    pub fn on_prompt(self, marker: &str, reply: &str) -> Self {
        self.prompt_rules
            .write()
            .unwrap()
            .push((marker.to_string(), reply.to_string()));
        self
    }

    pub fn with_default(mut self, reply: &str) -> Self {
        self.default_reply = Some(reply.to_string());
        self
    }

    /// Fail every call with the error built by `make`.
    pub fn fail_with(mut self, make: impl Fn() -> OpenAIError + Send + Sync + 'static) -> Self {
        self.failure = Some(Arc::new(make));
        self
    }

    /// Panic on requests for the given response type.
    pub fn panic_on(mut self, schema_name: &str) -> Self {
        self.panic_schema = Some(schema_name.to_string());
        self
    }

    /// Behave like a provider without credentials.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn calls(&self) -> Vec<MockProviderCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Calls expecting the given response type.
    pub fn calls_for(&self, schema_name: &str) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| c.schema_name == schema_name)
            .count()
    }

    fn reply_for(&self, request: &JsonRequest) -> Option<String> {
        let by_prompt = self
            .prompt_rules
            .read()
            .unwrap()
            .iter()
            .find(|(marker, _)| request.user.contains(marker.as_str()))
            .map(|(_, reply)| reply.clone());

        by_prompt
            .or_else(|| {
                self.schema_rules
                    .read()
                    .unwrap()
                    .get(&request.schema_name)
                    .cloned()
            })
            .or_else(|| self.default_reply.clone())
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete_json(&self, request: &JsonRequest) -> Result<String, OpenAIError> {
        self.calls.write().unwrap().push(MockProviderCall {
            schema_name: request.schema_name.clone(),
            model: request.model.clone(),
            user: request.user.clone(),
        });

        if self.panic_schema.as_deref() == Some(request.schema_name.as_str()) {
            panic!("mock provider panic for {}", request.schema_name);
        }

        if let Some(make) = &self.failure {
            return Err(make());
        }

        self.reply_for(request).ok_or_else(|| {
            OpenAIError::Parse(format!("no mock reply for {}", request.schema_name))
        })
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

// =============================================================================
// MockFetcher
// =============================================================================

#[derive(Debug, Clone)]
enum MockResponse {
    Page { text: String, links: Vec<PageLink> },
    Status(u16),
    Error(String),
    Panic,
}

/// Mock page fetcher with canned responses per URL.
///
/// Unknown URLs get the default page if one is set, otherwise a network
/// error. Every call is recorded in the event log.
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    responses: Arc<RwLock<HashMap<String, MockResponse>>>,
    redirects: Arc<RwLock<HashMap<String, String>>>,
    default_page: Option<String>,
    log: EventLog,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record fetch calls into a shared log.
    pub fn with_log(mut self, log: EventLog) -> Self {
        self.log = log;
        self
    }

    fn insert(self, url: &str, response: MockResponse) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(url.to_string(), response);
        self
    }

    pub fn with_page(self, url: &str, text: &str) -> Self {
        self.with_page_links(url, text, Vec::new())
    }

    pub fn with_page_links(self, url: &str, text: &str, links: Vec<PageLink>) -> Self {
        self.insert(
            url,
            MockResponse::Page {
                text: text.to_string(),
                links,
            },
        )
    }

    /// Upstream answers with this HTTP status.
    pub fn with_status(self, url: &str, code: u16) -> Self {
        self.insert(url, MockResponse::Status(code))
    }

    /// The proxy itself fails for this URL.
    pub fn with_error(self, url: &str, message: &str) -> Self {
        self.insert(url, MockResponse::Error(message.to_string()))
    }

    pub fn with_redirect(self, url: &str, final_url: &str) -> Self {
        self.redirects
            .write()
            .unwrap()
            .insert(url.to_string(), final_url.to_string());
        self
    }

    pub fn panic_on(self, url: &str) -> Self {
        self.insert(url, MockResponse::Panic)
    }

    pub fn with_default_page(mut self, text: &str) -> Self {
        self.default_page = Some(text.to_string());
        self
    }

    /// URLs fetched, in call order.
    pub fn fetched_urls(&self) -> Vec<String> {
        self.log
            .events()
            .into_iter()
            .filter_map(|e| match e {
                PipelineEvent::Fetch { url } => Some(url),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        self.log.push(PipelineEvent::Fetch {
            url: url.to_string(),
        });

        let response = self.responses.read().unwrap().get(url).cloned();
        let redirect = self.redirects.read().unwrap().get(url).cloned();

        let page = match response {
            Some(MockResponse::Page { text, links }) => FetchedPage::ok(text).with_links(links),
            Some(MockResponse::Status(code)) => FetchedPage::failed(code),
            Some(MockResponse::Error(message)) => return Err(FetchError::Network(message)),
            Some(MockResponse::Panic) => panic!("mock fetcher panic for {}", url),
            None => match &self.default_page {
                Some(text) => FetchedPage::ok(text.clone()),
                None => return Err(FetchError::Network(format!("no mock response for {}", url))),
            },
        };

        Ok(match redirect {
            Some(final_url) => page.with_final_url(final_url),
            None => page,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// =============================================================================
// RecordingRenderer
// =============================================================================

/// Renderer that records everything it is told.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    log: EventLog,
    rendered: Arc<RwLock<Vec<Link>>>,
    results: Arc<RwLock<Vec<(usize, VerificationResult)>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(mut self, log: EventLog) -> Self {
        self.log = log;
        self
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Links passed to `render`.
    pub fn rendered(&self) -> Vec<Link> {
        self.rendered.read().unwrap().clone()
    }

    /// Every update received for one row, in arrival order.
    pub fn statuses_for(&self, index: usize) -> Vec<LinkStatus> {
        self.results
            .read()
            .unwrap()
            .iter()
            .filter(|(i, _)| *i == index)
            .map(|(_, r)| r.status)
            .collect()
    }

    pub fn updates(&self) -> Vec<(usize, VerificationResult)> {
        self.results.read().unwrap().clone()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, links: &[Link]) {
        self.log.push(PipelineEvent::Render { count: links.len() });
        *self.rendered.write().unwrap() = links.to_vec();
    }

    fn update(&self, index: usize, result: &VerificationResult) {
        self.log.push(PipelineEvent::Update {
            index,
            status: result.status,
        });
        self.results.write().unwrap().push((index, result.clone()));
    }
}
