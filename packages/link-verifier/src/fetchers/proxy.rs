//! Client for the URL-fetch/content-extraction proxy.
//!
//! `GET <proxy>?url=<target>` answers either the extracted shape
//! `{text, links, status}` or the legacy raw-HTML shape `{contents, status}`.
//! Failures come back as a non-2xx status with an `{error}` body; only those
//! that also carry `upstream_status` are the target's own HTTP status.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::html::{extract_links, html_to_text};
use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{FetchedPage, PageFetcher};
use crate::types::page::PageLink;

/// Local development proxy (see the `fetch-proxy` package).
pub const DEFAULT_PROXY_URL: &str = "http://localhost:8787/api/fetch";

/// Links sampled from legacy HTML bodies.
const LEGACY_LINK_SAMPLE: usize = 25;

/// Client-side timeout; the proxy enforces its own shorter upstream timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Default, Deserialize)]
struct ProxyStatus {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    http_code: Option<u16>,
}

/// The two body shapes the proxy may answer with.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProxyResponse {
    Extracted {
        text: String,
        #[serde(default)]
        links: Vec<PageLink>,
        #[serde(default)]
        status: ProxyStatus,
    },
    Legacy {
        contents: String,
        #[serde(default)]
        status: ProxyStatus,
    },
}

#[derive(Debug, Deserialize)]
struct ProxyErrorBody {
    error: String,
    #[serde(default)]
    upstream_status: Option<u16>,
}

/// [`PageFetcher`] backed by the fetch proxy.
#[derive(Debug, Clone)]
pub struct ProxyFetcher {
    client: reqwest::Client,
    endpoint: Url,
}

impl ProxyFetcher {
    pub fn new(proxy_url: &str) -> FetchResult<Self> {
        let endpoint = Url::parse(proxy_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", proxy_url, e)))?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self { client, endpoint })
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request_url(&self, target: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("url", target);
        url
    }
}

#[async_trait]
impl PageFetcher for ProxyFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        debug!(url = %url, "Fetching through proxy");

        let response = self
            .client
            .get(self.request_url(url))
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Proxy request failed");
                FetchError::Network(e.to_string())
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        interpret(status, &body, url)
    }

    fn name(&self) -> &str {
        "proxy"
    }
}

/// Turn a proxy answer into a page.
fn interpret(status: u16, body: &str, requested: &str) -> FetchResult<FetchedPage> {
    if !(200..300).contains(&status) {
        return match serde_json::from_str::<ProxyErrorBody>(body) {
            Ok(ProxyErrorBody {
                error,
                upstream_status: Some(code),
            }) => {
                debug!(url = %requested, code, error = %error, "Upstream fetch failed");
                Ok(FetchedPage::failed(code))
            }
            // Proxy-side failures such as an upstream timeout
            Ok(ProxyErrorBody { error, .. }) => Err(FetchError::Proxy {
                status,
                message: error,
            }),
            Err(_) => Err(FetchError::Proxy {
                status,
                message: body.chars().take(200).collect(),
            }),
        };
    }

    let parsed: ProxyResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    let page = match parsed {
        ProxyResponse::Extracted {
            text,
            links,
            status,
        } => with_status(FetchedPage::ok(text).with_links(links), status),
        ProxyResponse::Legacy { contents, status } => {
            let base = status
                .url
                .as_deref()
                .and_then(|u| Url::parse(u).ok())
                .or_else(|| Url::parse(requested).ok());
            let links = extract_links(&contents, base.as_ref(), LEGACY_LINK_SAMPLE);
            with_status(FetchedPage::ok(html_to_text(&contents)).with_links(links), status)
        }
    };

    Ok(page)
}

fn with_status(mut page: FetchedPage, status: ProxyStatus) -> FetchedPage {
    if let Some(code) = status.http_code {
        page.code = code;
    }
    if let Some(final_url) = status.url {
        page = page.with_final_url(final_url);
    }
    page
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracted_shape() {
        let body = r#"{"text":"Hello 81%","links":[{"text":"Data","url":"https://d.org"}],
            "status":{"url":"https://example.com/final","content_type":"text/html","http_code":200}}"#;

        let page = interpret(200, body, "https://example.com").unwrap();
        assert_eq!(page.code, 200);
        assert_eq!(page.text, "Hello 81%");
        assert_eq!(page.final_url.as_deref(), Some("https://example.com/final"));
        assert_eq!(page.links, vec![PageLink::new("Data", "https://d.org")]);
    }

    #[test]
    fn test_legacy_shape_stripped_locally() {
        let body = r#"{"contents":"<p>Sales rose <b>79%</b></p><a href=\"/src\">Source</a>","status":{"http_code":200}}"#;

        let page = interpret(200, body, "https://example.com/post").unwrap();
        assert_eq!(page.text, "Sales rose 79%\nSource");
        assert_eq!(page.links, vec![PageLink::new("Source", "https://example.com/src")]);
        assert_eq!(page.final_url, None);
    }

    #[test]
    fn test_upstream_failure_becomes_code() {
        let body = r#"{"error":"Upstream returned 404","upstream_status":404}"#;
        let page = interpret(404, body, "https://x.com").unwrap();
        assert_eq!(page.code, 404);
        assert!(page.text.is_empty());
    }

    #[test]
    fn test_proxy_own_failures_are_errors() {
        let err = interpret(504, r#"{"error":"Upstream request timed out"}"#, "https://x.com")
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::Proxy { status: 504, ref message } if message == "Upstream request timed out"
        ));

        let err = interpret(500, r#"{"error":"Internal error: body decode"}"#, "https://x.com")
            .unwrap_err();
        assert!(matches!(err, FetchError::Proxy { status: 500, .. }));

        let body = r#"{"error":"Could not connect to upstream: refused"}"#;
        let err = interpret(502, body, "https://x.com").unwrap_err();
        assert!(matches!(err, FetchError::Proxy { status: 502, .. }));
    }

    #[test]
    fn test_non_json_failure_is_proxy_error() {
        let err = interpret(502, "<html>Bad Gateway</html>", "https://x.com").unwrap_err();
        assert!(matches!(err, FetchError::Proxy { status: 502, .. }));
    }

    #[test]
    fn test_unknown_shape_is_decode_error() {
        let err = interpret(200, r#"{"unexpected":true}"#, "https://x.com").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn test_request_url_encodes_target() {
        let fetcher = ProxyFetcher::new(DEFAULT_PROXY_URL).unwrap();
        let url = fetcher.request_url("https://example.com/a?b=c&d=e");
        assert_eq!(
            url.as_str(),
            "http://localhost:8787/api/fetch?url=https%3A%2F%2Fexample.com%2Fa%3Fb%3Dc%26d%3De"
        );
    }

    #[test]
    fn test_invalid_proxy_url() {
        assert!(matches!(
            ProxyFetcher::new("not a url"),
            Err(FetchError::InvalidUrl(_))
        ));
    }
}
