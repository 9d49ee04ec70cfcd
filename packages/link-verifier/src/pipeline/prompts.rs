//! Prompts for classification, relevance and citation checks.

use std::fmt::Write;

use crate::types::link::Link;
use crate::types::page::PageContent;

/// Phrases that mark a page as reporting someone else's findings.
pub const SECONDARY_SOURCE_PHRASES: &[&str] = &[
    "according to",
    "reported by",
    "study published in",
    "research from",
    "cited in",
    "source:",
    "via",
    "as reported",
    "originally published",
];

pub const CLASSIFY_SYSTEM_PROMPT: &str = r#"You classify hyperlinks in a document as CITATIONS or REGULAR links.

A CITATION is a link offered as evidence for a specific factual or statistical claim in its sentence.
A REGULAR link is navigation, further reading, a product or a homepage.

## Rules
1. If the anchor text itself contains a number or percent sign, it is a citation.
2. If the sentence contains a number that is NOT inside any anchor text ("unlinked numbers") and the anchor or URL plausibly names a source (report, study, survey, data, statistics, research, a .pdf, a press page), it is a citation.
3. If every number in the sentence is already inside some anchor text, the other links in that sentence are regular.
4. Attribution phrases ("according to", "found that", "reported", "published") strengthen a citation.
5. When uncertain, answer regular.

## Output
Return one entry per link index, every index exactly once: {"classifications": [{"index": 0, "isCitation": true}, ...]}"#;

pub const RELEVANCE_SYSTEM_PROMPT: &str = r#"You check whether a hyperlink's anchor text matches the topic of the page it points to.

Judge topical match only, not factual accuracy. Generic anchors ("homepage", "learn more") are relevant when the page belongs to the named site or subject.

Return {"isRelevant": true|false, "reasoning": "<one sentence>"}"#;

pub const CITATION_SYSTEM_PROMPT: &str = r#"You verify whether a web page supports a claim that cites it.

## Instructions
- Compare the claim context with the page excerpt. Pay close attention to numbers, percentages, dates and named entities.
- isCorrect is true only if the page states the claim's facts. A related page without the specific figure is NOT support.
- exactQuote must be copied verbatim from the page excerpt: the shortest passage that supports the claim. Use null when nothing supports it.
- If the page is a secondary source that reports someone else's findings, and one of the page's own links looks like the original source, put that link in suggestedUrl.
- If the claim is unsupported and you know a page that supports it, put it in suggestedUrl. Otherwise use null.
- reasoning: one or two sentences.

Return {"isCorrect": true|false, "reasoning": "...", "exactQuote": "..."|null, "suggestedUrl": "..."|null}"#;

/// Whether the page text reads like a secondary source.
pub fn looks_secondary(text: &str) -> bool {
    let lower = text.to_lowercase();
    SECONDARY_SOURCE_PHRASES.iter().any(|phrase| {
        if phrase.chars().all(char::is_alphanumeric) {
            // single short words must stand alone ("via", not "aviation")
            lower
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| word == *phrase)
        } else {
            lower.contains(phrase)
        }
    })
}

fn join_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "none".to_string()
    } else {
        values.join(", ")
    }
}

/// User prompt enumerating every link with its sentence and numeric features.
pub fn classification_prompt(links: &[Link]) -> String {
    let mut prompt = String::from("Classify each link.\n");

    for (index, link) in links.iter().enumerate() {
        let sentence = if link.sentence.is_empty() {
            &link.context
        } else {
            &link.sentence
        };
        let f = &link.features;

        let _ = write!(
            prompt,
            "\n[{index}]\nSentence: {sentence}\nAnchor: {anchor}\nURL: {url}\n\
             Anchor numbers: {anchor_numbers}\nNumbers in any anchor of the sentence: {sentence_anchor}\n\
             Sentence numbers: {sentence_numbers}\nUnlinked numbers: {unlinked}\n",
            anchor = link.text,
            url = link.url,
            anchor_numbers = join_or_none(&f.anchor_numbers),
            sentence_anchor = join_or_none(&f.sentence_anchor_numbers),
            sentence_numbers = join_or_none(&f.sentence_numbers),
            unlinked = join_or_none(&f.unlinked_numbers),
        );
    }

    prompt
}

pub fn relevance_prompt(link: &Link, page: &PageContent) -> String {
    format!(
        "Anchor text: {}\nURL: {}\n\nPage excerpt:\n{}",
        link.text, link.url, page.text
    )
}

pub fn citation_prompt(link: &Link, page: &PageContent, max_links: usize) -> String {
    let mut prompt = format!(
        "Claim context: {}\nAnchor text: {}\nURL: {}\n\nPage excerpt:\n{}\n",
        link.context, link.text, link.url, page.text
    );

    if looks_secondary(&page.text) {
        prompt.push_str(
            "\nThis page appears to be a secondary source. Prefer suggesting the primary source from its links.\n",
        );
    }

    let outbound: Vec<_> = page.links.iter().take(max_links).collect();
    if !outbound.is_empty() {
        prompt.push_str("\nLinks on the page:\n");
        for l in outbound {
            let _ = writeln!(prompt, "- {} ({})", l.text, l.url);
        }
    }

    prompt
}
