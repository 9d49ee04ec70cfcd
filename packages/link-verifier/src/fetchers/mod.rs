//! Page fetching through the fetch proxy.

pub mod content;
pub mod html;
pub mod proxy;

pub use content::{normalize_url, ContentFetcher};
pub use proxy::{ProxyFetcher, DEFAULT_PROXY_URL};
