//! Batch classification of links as citations or regular links.
//!
//! One model call labels every link. Any failure degrades to the
//! heuristics, and the heuristic override pass always runs afterwards.

use schemars::JsonSchema;
use serde::Deserialize;
use std::time::Instant;
use tracing::{info, warn};

use super::heuristics::{fallback_classification, refine_with_heuristics};
use super::prompts::{classification_prompt, CLASSIFY_SYSTEM_PROMPT};
use crate::error::{Result, VerifierError};
use crate::providers::complete_structured;
use crate::traits::provider::ChatProvider;
use crate::types::config::VerifierConfig;
use crate::types::link::Link;

/// Model response for batch classification.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ClassificationResponse {
    /// One entry per link index
    pub classifications: Vec<ClassificationItem>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationItem {
    /// Zero-based link index from the prompt
    pub index: usize,
    /// True when the link supports a specific claim in its sentence
    pub is_citation: bool,
}

/// How the labels were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSource {
    Model,
    Heuristic,
}

/// Label every link in place. Never fails.
pub async fn classify_links(
    links: &mut [Link],
    provider: &dyn ChatProvider,
    config: &VerifierConfig,
) -> ClassificationSource {
    if links.is_empty() {
        return ClassificationSource::Model;
    }

    let start = Instant::now();

    let source = match request_classification(links, provider, config).await {
        Ok(response) => {
            merge(links, &response);
            ClassificationSource::Model
        }
        Err(e) => {
            warn!(error = %e, "Classification failed, using heuristics");
            fallback_classification(links);
            ClassificationSource::Heuristic
        }
    };

    refine_with_heuristics(links);

    info!(
        links = links.len(),
        citations = links.iter().filter(|l| l.is_citation).count(),
        source = ?source,
        duration_ms = start.elapsed().as_millis() as u64,
        "Classification complete"
    );

    source
}

async fn request_classification(
    links: &[Link],
    provider: &dyn ChatProvider,
    config: &VerifierConfig,
) -> Result<ClassificationResponse> {
    let response: ClassificationResponse = complete_structured(
        provider,
        &config.classification_model,
        CLASSIFY_SYSTEM_PROMPT,
        classification_prompt(links),
        config.temperature,
    )
    .await?;

    if response.classifications.is_empty() {
        return Err(VerifierError::Parse("empty classification list".into()));
    }

    Ok(response)
}

/// Apply labels by index and return how many links got no label. Missing
/// indices keep their current value.
fn merge(links: &mut [Link], response: &ClassificationResponse) -> usize {
    let mut labelled = vec![false; links.len()];
    for item in &response.classifications {
        match links.get_mut(item.index) {
            Some(link) => {
                link.is_citation = item.is_citation;
                labelled[item.index] = true;
            }
            None => warn!(index = item.index, "Classification index out of range"),
        }
    }

    let missing = labelled.iter().filter(|seen| !**seen).count();
    if missing > 0 {
        warn!(missing, "Classification omitted some links");
    }
    missing
}
