//! Citation-aware link checker.
//!
//! Takes a markdown document, finds every hyperlink, decides which links
//! cite a specific claim, and verifies each one:
//!
//! - every link is probed for liveness through the fetch proxy
//! - regular links are checked for topical relevance
//! - citations must be supported by a verbatim quote from the fetched page
//!   that repeats the claim's figures
//!
//! Every link ends `verified`, `invalid` or `inaccurate` with an explanation.
//! Model failures degrade to deterministic heuristics; only missing
//! credentials stop a run from starting.
//!
//! # Usage
//!
//! ```rust,ignore
//! use link_verifier::{LinkVerifier, ProviderConfig, VerifierConfig, NullRenderer};
//! use tokio_util::sync::CancellationToken;
//!
//! let verifier = LinkVerifier::from_config(
//!     VerifierConfig::default(),
//!     &[ProviderConfig::openai(std::env::var("OPENAI_API_KEY")?)],
//!     link_verifier::DEFAULT_PROXY_URL,
//! )?;
//!
//! let report = verifier.run(markdown, &NullRenderer, &CancellationToken::new()).await?;
//! for result in &report.results {
//!     println!("{} {}", result.status, result.original_url);
//! }
//! ```

pub mod error;
pub mod fetchers;
pub mod pipeline;
pub mod providers;
pub mod testing;
pub mod traits;
pub mod types;

pub use error::{FetchError, FetchResult, Result, VerifierError};
pub use fetchers::{ContentFetcher, ProxyFetcher, DEFAULT_PROXY_URL};
pub use pipeline::{
    extract, extract_unique, ClassificationSource, LinkVerifier, RunReport, RunSummary,
};
pub use providers::{OpenAIProvider, OpenRouterProvider, ProviderChain};
pub use secrecy::SecretString;
pub use traits::{
    fetcher::{FetchedPage, PageFetcher},
    provider::{ChatProvider, JsonRequest},
    renderer::{NullRenderer, Renderer},
};
pub use types::{
    config::{ProviderConfig, VerifierConfig, DEFAULT_MODEL, DEFAULT_OPENROUTER_MODEL},
    link::{Link, LinkFeatures, LinkStatus, VerificationResult},
    page::{FetchedData, HttpStatus, PageContent, PageLink},
};
