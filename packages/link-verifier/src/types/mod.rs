//! Data types shared across the pipeline.

pub mod config;
pub mod link;
pub mod page;
