//! Fetch proxy
//!
//! Small HTTP service the link checker talks to:
//! - `GET /api/fetch?url=` fetches a page and returns its readable text,
//!   outbound links and final status
//! - `GET|POST /api/chat` forwards chat completions with a server-held key
//! - `GET /health` reports liveness
//!
//! Every response carries permissive CORS headers so browser front ends can
//! call it directly.

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

pub use app::{build_app, AppState};
pub use config::ProxyConfig;
pub use error::ProxyError;
pub use extract::{extract_links, extract_text, ExtractedLink};
