//! Liveness and content retrieval for one link.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use url::Url;

use crate::traits::fetcher::{FetchedPage, PageFetcher};
use crate::types::config::VerifierConfig;
use crate::types::page::{FetchedData, HttpStatus, PageContent, CONTENT_UNAVAILABLE};

/// Wraps a [`PageFetcher`] with status classification, redirect detection
/// and page caps. Never fails: problems are recorded on the result.
#[derive(Clone)]
pub struct ContentFetcher {
    fetcher: Arc<dyn PageFetcher>,
    max_chars: usize,
    max_links: usize,
}

impl ContentFetcher {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: &VerifierConfig) -> Self {
        Self {
            fetcher,
            max_chars: config.max_page_chars,
            max_links: config.max_page_links,
        }
    }

    pub async fn fetch(&self, url: &str) -> FetchedData {
        let start = Instant::now();
        let target = normalize_url(url);

        let page = match self.fetcher.fetch(&target).await {
            Ok(page) => page,
            Err(e) => {
                // Unknown status counts as ok so verification is not blocked
                warn!(url = %target, error = %e, "Fetch failed, status unknown");
                return FetchedData::without_content(HttpStatus::unknown(), CONTENT_UNAVAILABLE);
            }
        };

        let redirect_url = page
            .final_url
            .as_deref()
            .filter(|final_url| is_redirect(&target, final_url))
            .map(str::to_string);
        let status = HttpStatus::from_code(page.code, redirect_url);

        debug!(
            url = %target,
            code = page.code,
            duration_ms = start.elapsed().as_millis() as u64,
            "Fetched"
        );

        if !status.ok {
            let error = status.describe();
            return FetchedData::without_content(status, error);
        }

        match self.content(page) {
            Some(content) => FetchedData::page(status, content),
            None => {
                warn!(url = %target, "Page returned no text");
                FetchedData::without_content(status, CONTENT_UNAVAILABLE)
            }
        }
    }

    fn content(&self, page: FetchedPage) -> Option<PageContent> {
        let text = page.text.trim();
        if text.is_empty() {
            return None;
        }

        Some(PageContent {
            text: text.chars().take(self.max_chars).collect(),
            links: page.links.into_iter().take(self.max_links).collect(),
        })
    }
}

/// Trim and add `https://` to scheme-less hosts.
///
/// Absolute `http(s)` URLs are returned unchanged. Relative paths and
/// fragments are passed through so the proxy rejects them.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();

    if lower.starts_with("http://") || lower.starts_with("https://") {
        return url.to_string();
    }
    if url.starts_with("//") {
        return format!("https:{}", url);
    }
    if looks_like_host(url) {
        return format!("https://{}", url);
    }
    url.to_string()
}

fn looks_like_host(url: &str) -> bool {
    if url.contains("://") || url.starts_with('/') || url.starts_with('#') || url.starts_with('.') {
        return false;
    }
    let host = url.split(['/', '?', '#']).next().unwrap_or_default();
    host.contains('.') && !host.contains(' ') && !host.contains(':')
}

/// A final URL counts as a redirect unless it only differs by a trailing slash.
fn is_redirect(requested: &str, final_url: &str) -> bool {
    let canonical = |u: &str| {
        Url::parse(u)
            .map(|parsed| parsed.to_string())
            .unwrap_or_else(|_| u.to_string())
            .trim_end_matches('/')
            .to_string()
    };
    canonical(requested) != canonical(final_url)
}
