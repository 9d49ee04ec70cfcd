//! The link-check pipeline.
//!
//! ```text
//! markdown ─▶ context ─▶ classify ─▶ render ─▶ verify (fetch phase, verify phase)
//!                          │                     │
//!                     heuristics            grounding
//! ```

pub mod classify;
pub mod context;
pub mod coordinator;
pub mod figures;
pub mod grounding;
pub mod heuristics;
pub mod prompts;
pub mod verify;

pub use classify::{classify_links, ClassificationSource};
pub use context::{extract, extract_unique};
pub use coordinator::{LinkVerifier, RunReport, RunSummary};
pub use grounding::{check_grounding, GroundingFailure};
pub use heuristics::{fallback_classification, refine_with_heuristics};
pub use verify::VerificationEngine;
