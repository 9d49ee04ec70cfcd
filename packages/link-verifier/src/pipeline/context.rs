//! Context extraction around markdown links.
//!
//! For every `[label](target)` in the input this derives the containing
//! sentence, a bounded context snippet (sentence plus short neighbours) and
//! the numeric features of the sentence used by classification.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

use super::figures::{extract_numbers, has_digit, normalize_number};
use crate::types::link::{Link, LinkFeatures};

/// Maximum context length in characters.
pub const CONTEXT_MAX_CHARS: usize = 360;

/// Neighbour sentences at or above this length are left out of the context.
pub const NEIGHBOR_MAX_CHARS: usize = 180;

const ELLIPSIS: &str = "...";

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\(([^)\s]+)[^)]*\)").expect("valid link regex")
});

static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]*\)").expect("valid image regex"));

static BLANK_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n[ \t]*\r?\n").expect("valid blank line regex"));

/// A link occurrence located in the raw text.
#[derive(Debug, Clone)]
struct LinkMatch {
    start: usize,
    end: usize,
    label: String,
    url: String,
}

/// Extract every link occurrence, left to right.
pub fn extract(markdown: &str) -> Vec<Link> {
    let matches = find_links(markdown);
    let links: Vec<Link> = matches
        .iter()
        .map(|m| build_link(markdown, m, &matches))
        .collect();

    debug!(count = links.len(), "Extracted links");
    links
}

/// Extract links, keeping only the first occurrence of each URL.
pub fn extract_unique(markdown: &str) -> Vec<Link> {
    let mut seen = HashSet::new();
    extract(markdown)
        .into_iter()
        .filter(|link| seen.insert(link.url.clone()))
        .collect()
}

/// Replace link and image syntax with the label and normalize whitespace.
pub fn plain_text(markdown: &str) -> String {
    let without_images = IMAGE_RE.replace_all(markdown, "$1");
    let without_links = LINK_RE.replace_all(&without_images, "$1");
    normalize_whitespace(&without_links)
}

/// Collapse whitespace runs to single spaces and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn find_links(text: &str) -> Vec<LinkMatch> {
    LINK_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            // `![alt](src)` is an image, not a hyperlink
            if whole.start() > 0 && text.as_bytes()[whole.start() - 1] == b'!' {
                return None;
            }
            Some(LinkMatch {
                start: whole.start(),
                end: whole.end(),
                label: caps.get(1)?.as_str().trim().to_string(),
                url: caps.get(2)?.as_str().trim().to_string(),
            })
        })
        .collect()
}

fn build_link(markdown: &str, m: &LinkMatch, all: &[LinkMatch]) -> Link {
    let (para_start, para_end) = paragraph_bounds(markdown, m.start, m.end);
    let paragraph = &markdown[para_start..para_end];

    let protected: Vec<(usize, usize)> = all
        .iter()
        .filter(|o| o.start >= para_start && o.end <= para_end)
        .map(|o| (o.start - para_start, o.end - para_start))
        .collect();

    let spans = sentence_spans(paragraph, &protected);
    let link = Link::new(m.label.clone(), m.url.clone());

    if spans.is_empty() {
        return link.with_context(truncate_context(&plain_text(paragraph)));
    }

    let rel = m.start - para_start;
    let idx = spans
        .iter()
        .position(|&(s, e)| s <= rel && rel < e)
        .or_else(|| spans.iter().position(|&(_, e)| e > rel))
        .unwrap_or(spans.len() - 1);

    let (s, e) = spans[idx];
    let sentence_raw = &paragraph[s..e];

    link.with_sentence(plain_text(sentence_raw))
        .with_context(build_context(paragraph, &spans, idx))
        .with_features(sentence_features(sentence_raw, &m.label))
}

/// Byte range of the paragraph around `[start, end)`, bounded by blank lines.
fn paragraph_bounds(text: &str, start: usize, end: usize) -> (usize, usize) {
    let para_start = BLANK_LINE_RE
        .find_iter(&text[..start])
        .last()
        .map(|b| b.end())
        .unwrap_or(0);
    let para_end = BLANK_LINE_RE
        .find(&text[end..])
        .map(|b| end + b.start())
        .unwrap_or(text.len());
    (para_start, para_end)
}

/// Sentence byte spans, split after `.`, `!` or `?` followed by whitespace
/// or end of text. Punctuation inside `protected` ranges never splits.
fn sentence_spans(text: &str, protected: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') || protected.iter().any(|&(s, e)| s <= i && i < e) {
            continue;
        }

        let mut end = i + c.len_utf8();
        while let Some(&(j, next)) = chars.peek() {
            if matches!(next, '.' | '!' | '?' | '"' | '\'' | '\u{201D}' | '\u{2019}') {
                end = j + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }

        let at_boundary = chars.peek().map_or(true, |&(_, next)| next.is_whitespace());
        if at_boundary {
            push_span(&mut spans, text, start, end);
            start = end;
        }
    }

    push_span(&mut spans, text, start, text.len());
    spans
}

fn push_span(spans: &mut Vec<(usize, usize)>, text: &str, start: usize, end: usize) {
    let slice = &text[start..end];
    let trimmed_start = start + (slice.len() - slice.trim_start().len());
    let trimmed_end = start + slice.trim_end().len();
    if trimmed_end > trimmed_start {
        spans.push((trimmed_start, trimmed_end));
    }
}

fn build_context(paragraph: &str, spans: &[(usize, usize)], idx: usize) -> String {
    let sentence_at = |i: usize| plain_text(&paragraph[spans[i].0..spans[i].1]);

    let mut context = sentence_at(idx);

    if idx > 0 {
        let prev = sentence_at(idx - 1);
        if !prev.is_empty() && char_len(&prev) < NEIGHBOR_MAX_CHARS {
            context = format!("{} {}", prev, context);
        }
    }

    if idx + 1 < spans.len() {
        let next = sentence_at(idx + 1);
        let joined = char_len(&context) + 1 + char_len(&next);
        if !next.is_empty() && char_len(&next) < NEIGHBOR_MAX_CHARS && joined < CONTEXT_MAX_CHARS {
            context = format!("{} {}", context, next);
        }
    }

    truncate_context(&context)
}

fn truncate_context(text: &str) -> String {
    if char_len(text) <= CONTEXT_MAX_CHARS {
        return text.to_string();
    }
    let keep = CONTEXT_MAX_CHARS - ELLIPSIS.len();
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.truncate(truncated.trim_end().len());
    truncated.push_str(ELLIPSIS);
    truncated
}

fn sentence_features(sentence_raw: &str, label: &str) -> LinkFeatures {
    let mut sentence_anchor_numbers: Vec<String> = Vec::new();
    for anchor in find_links(sentence_raw) {
        for number in extract_numbers(&anchor.label) {
            if !sentence_anchor_numbers.contains(&number) {
                sentence_anchor_numbers.push(number);
            }
        }
    }

    let sentence_numbers = extract_numbers(&plain_text(sentence_raw));

    let claimed: HashSet<String> = sentence_anchor_numbers
        .iter()
        .map(|n| normalize_number(n))
        .collect();
    let unlinked_numbers = sentence_numbers
        .iter()
        .filter(|n| !claimed.contains(&normalize_number(n)))
        .cloned()
        .collect();

    LinkFeatures {
        anchor_has_number: has_digit(label) || label.contains('%'),
        sentence_has_number: !sentence_numbers.is_empty(),
        anchor_numbers: extract_numbers(label),
        sentence_anchor_numbers,
        sentence_numbers,
        unlinked_numbers,
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
