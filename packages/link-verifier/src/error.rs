//! Typed errors for the link verifier.
//!
//! Only configuration problems and cancellation ever surface from a
//! pipeline run. Provider, parse and fetch errors are recovered per link
//! and turned into an explained terminal status; a fetch error is fatal
//! only while building the proxy fetcher.

use openai_client::OpenAIError;
use thiserror::Error;

/// Errors raised by classification, verification and the coordinator.
#[derive(Debug, Error)]
pub enum VerifierError {
    /// Missing credentials or an unusable setup; fatal before any batch runs
    #[error("configuration error: {0}")]
    Config(String),

    /// Every configured LLM provider failed
    #[error("LLM provider error: {0}")]
    Provider(#[from] OpenAIError),

    /// Model output did not match the documented response schema
    #[error("could not parse model response: {0}")]
    Parse(String),

    /// Proxy fetcher could not be built
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Run was cancelled at a batch boundary
    #[error("run cancelled")]
    Cancelled,
}

/// Errors from the URL-fetch/content-extraction proxy.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Proxy unreachable, connection reset, timeout
    #[error("network error: {0}")]
    Network(String),

    /// Proxy answered with a failure that is not an upstream status
    #[error("proxy error ({status}): {message}")]
    Proxy { status: u16, message: String },

    /// Proxy body was not one of the known response shapes
    #[error("could not decode proxy response: {0}")]
    Decode(String),

    /// Proxy endpoint itself is not a valid URL
    #[error("invalid proxy URL: {0}")]
    InvalidUrl(String),
}

/// Result type alias for verifier operations.
pub type Result<T> = std::result::Result<T, VerifierError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
