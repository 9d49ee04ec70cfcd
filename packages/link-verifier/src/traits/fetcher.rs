//! Page fetcher trait.
//!
//! Implementations perform the network access (normally through the
//! fetch proxy) and return page text that is already stripped of markup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FetchResult;
use crate::types::page::PageLink;

/// A fetched page as reported by the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedPage {
    /// HTTP status of the upstream response
    pub code: u16,

    /// URL after redirects, if the proxy reported one
    pub final_url: Option<String>,

    /// Extracted text, empty on failure
    pub text: String,

    pub links: Vec<PageLink>,
}

impl FetchedPage {
    /// Successful fetch with text.
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            code: 200,
            final_url: None,
            text: text.into(),
            links: Vec::new(),
        }
    }

    /// Upstream answered with a failure status.
    pub fn failed(code: u16) -> Self {
        Self {
            code,
            final_url: None,
            text: String::new(),
            links: Vec::new(),
        }
    }

    pub fn with_final_url(mut self, url: impl Into<String>) -> Self {
        self.final_url = Some(url.into());
        self
    }

    pub fn with_links(mut self, links: Vec<PageLink>) -> Self {
        self.links = links;
        self
    }
}

/// Fetches a URL and returns its status, final URL, text and links.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch one URL.
    ///
    /// An `Err` means the status is unknown (proxy unreachable, garbled
    /// response). Upstream HTTP failures come back as `Ok` with the code.
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage>;

    fn name(&self) -> &str;
}
