//! Output renderers: a colored terminal table and JSON lines.

mod json;
mod terminal;

pub use json::JsonRenderer;
pub use terminal::TerminalRenderer;

use link_verifier::{Renderer, RunReport};
use std::sync::{Mutex, MutexGuard};

/// A [`Renderer`] that also prints the end-of-run summary.
pub trait ReportRenderer: Renderer {
    fn finish(&self, report: &RunReport);
}

/// Writers are shared between concurrent `update` calls.
fn lock<W>(writer: &Mutex<W>) -> MutexGuard<'_, W> {
    writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
