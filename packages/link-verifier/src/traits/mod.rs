//! Seams between the pipeline and its collaborators.
//!
//! - [`provider::ChatProvider`] - LLM chat completion returning JSON text
//! - [`fetcher::PageFetcher`] - URL fetch plus HTML-to-text extraction
//! - [`renderer::Renderer`] - presentation of the link table

pub mod fetcher;
pub mod provider;
pub mod renderer;
