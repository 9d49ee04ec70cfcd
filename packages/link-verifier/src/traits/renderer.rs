//! Rendering collaborator.

use crate::types::link::{Link, VerificationResult};

/// Receives the link table and per-link status updates.
///
/// `update` calls for links in the same batch may arrive in any order.
pub trait Renderer: Send + Sync {
    /// Draw the initial table.
    fn render(&self, links: &[Link]);

    /// Patch one row.
    fn update(&self, index: usize, result: &VerificationResult);
}

/// Renderer that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&self, _links: &[Link]) {}

    fn update(&self, _index: usize, _result: &VerificationResult) {}
}
