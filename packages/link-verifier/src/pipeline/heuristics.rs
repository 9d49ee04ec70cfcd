//! Deterministic citation heuristics.
//!
//! Pure functions over `(context, anchor, url, features)`. Used alone when
//! the model is unreachable, and as an override pass after every model
//! classification.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::figures::has_digit;
use crate::types::link::{Link, LinkFeatures};

/// Words in an anchor or URL that suggest the target is a data source.
const SOURCE_WORDS: &[&str] = &[
    "report",
    "study",
    "research",
    "survey",
    "data",
    "statistics",
    "increase",
    "decrease",
    "percent",
    "percentage",
];

/// URL fragments typical of statistics or publication pages.
const STATS_URL_HINTS: &[&str] = &[
    "stats",
    "statistics",
    "/research",
    "/study",
    "/report",
    "whitepaper",
    ".pdf",
    "/press",
];

static SOURCE_WORD_RE: LazyLock<Regex> = LazyLock::new(|| word_list_regex(SOURCE_WORDS));

static ATTRIBUTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    word_list_regex(&[
        "according to",
        "announced",
        "reported",
        "stated",
        "says",
        "said",
        "found that",
        "finds",
        "shows",
        "study",
        "research",
        "survey",
        "trial",
        "report",
        "published",
        "press release",
        "revealed",
    ])
});

static STAT_TERM_RE: LazyLock<Regex> = LazyLock::new(|| {
    word_list_regex(&[
        "percent",
        "percentage",
        "per cent",
        "rate",
        "average",
        "median",
        "majority",
        "million",
        "billion",
        "trillion",
        "share",
        "growth",
        "decline",
        "increase",
        "decrease",
        "statistics",
        "data",
    ])
});

static GENERIC_ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:homepage|home|learn more|click here|read more|about us|contact|what is|guide|overview)\b",
    )
    .expect("valid generic anchor regex")
});

/// Case-insensitive match of any phrase starting at a word boundary.
/// Plural and inflected forms (`reports`, `surveyed`) still match.
fn word_list_regex(words: &[&str]) -> Regex {
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})", alternation)).expect("valid word list regex")
}

/// Rule 1: the anchor text itself carries a numeral or percent sign.
pub fn anchor_has_figure(anchor: &str) -> bool {
    has_digit(anchor) || anchor.contains('%')
}

/// Whether the URL looks like a statistics or publication page.
pub fn url_suggests_stats(url: &str) -> bool {
    let url = url.to_lowercase();
    STATS_URL_HINTS.iter().any(|hint| url.contains(hint))
}

fn mentions_source(anchor: &str, url: &str) -> bool {
    SOURCE_WORD_RE.is_match(anchor)
        || SOURCE_WORDS.iter().any(|w| url.to_lowercase().contains(w))
        || url_suggests_stats(url)
}

/// Rules 1 and 2: signals strong enough to override the model.
pub fn strong_citation_signal(anchor: &str, url: &str, features: &LinkFeatures) -> bool {
    if anchor_has_figure(anchor) {
        return true;
    }
    !features.unlinked_numbers.is_empty() && mentions_source(anchor, url)
}

/// Context-level rule 3.
fn context_signal(context: &str, anchor: &str, url: &str) -> bool {
    let has_number = has_digit(context) || has_digit(anchor);
    let has_stat_term = STAT_TERM_RE.is_match(context) || STAT_TERM_RE.is_match(anchor);

    (ATTRIBUTION_RE.is_match(context) && (has_number || has_stat_term))
        || (has_number && url_suggests_stats(url))
}

/// Ordered decision list; first matching rule wins.
pub fn classify(context: &str, anchor: &str, url: &str, features: &LinkFeatures) -> bool {
    strong_citation_signal(anchor, url, features) || context_signal(context, anchor, url)
}

pub fn classify_link(link: &Link) -> bool {
    classify(&link.context, &link.text, &link.url, &link.features)
}

/// Navigation-style anchor ("learn more", "homepage", ...).
pub fn is_generic_anchor(anchor: &str) -> bool {
    GENERIC_ANCHOR_RE.is_match(anchor)
}

/// Override pass run after every classification.
///
/// Forces citation on rule 1/2 hits, then forces regular on generic anchors
/// without a numeral. Anchors with a numeral are never flipped to regular.
pub fn refine_with_heuristics(links: &mut [Link]) {
    for (index, link) in links.iter_mut().enumerate() {
        if !link.is_citation && strong_citation_signal(&link.text, &link.url, &link.features) {
            debug!(index, url = %link.url, "Override: forced citation");
            link.is_citation = true;
        }

        if link.is_citation && is_generic_anchor(&link.text) && !anchor_has_figure(&link.text) {
            debug!(index, url = %link.url, "Override: generic anchor forced regular");
            link.is_citation = false;
        }
    }
}

/// Classify every link with the heuristics alone.
pub fn fallback_classification(links: &mut [Link]) {
    for link in links.iter_mut() {
        link.is_citation = classify_link(link);
    }
}
