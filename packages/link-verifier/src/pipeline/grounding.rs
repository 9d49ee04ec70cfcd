//! Grounding gate for citations the model judged correct.
//!
//! A claim is only accepted when the model's quote can be found verbatim
//! in the fetched page and, if the claim carries figures, the quote
//! repeats at least one of them.

use std::fmt;

use super::context::normalize_whitespace;
use super::figures::{extract_figures, Figure};

/// Why a model-approved citation was not accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum GroundingFailure {
    MissingQuote,
    QuoteNotFound,
    FigureMismatch { expected: Vec<String> },
}

impl fmt::Display for GroundingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingQuote => write!(f, "No exact quote was provided to support the claim"),
            Self::QuoteNotFound => write!(f, "The quoted text was not found on the page"),
            Self::FigureMismatch { expected } => write!(
                f,
                "The quote does not contain the claimed figure ({})",
                expected.join(", ")
            ),
        }
    }
}

/// Lowercase, unify typographic quotes and dashes, collapse whitespace.
pub fn normalize_for_match(text: &str) -> String {
    let unified: String = text
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201B}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201F}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{00A0}' => ' ',
            other => other,
        })
        .collect();
    normalize_whitespace(&unified).to_lowercase()
}

fn trim_quote(quote: &str) -> &str {
    quote
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '\u{2026}' | '.') || c.is_whitespace())
}

/// Check a model-supplied quote against the page and the claim.
///
/// Returns the trimmed quote on success.
pub fn check_grounding(
    quote: Option<&str>,
    page_text: &str,
    claim_context: &str,
) -> Result<String, GroundingFailure> {
    let quote = quote.map(trim_quote).unwrap_or_default();
    if quote.is_empty() {
        return Err(GroundingFailure::MissingQuote);
    }

    if !normalize_for_match(page_text).contains(&normalize_for_match(quote)) {
        return Err(GroundingFailure::QuoteNotFound);
    }

    let claimed = extract_figures(claim_context);
    if !claimed.is_empty() {
        let quoted = extract_figures(quote);
        let matched = claimed
            .iter()
            .any(|c| quoted.iter().any(|q: &Figure| q.same_value(c)));

        if !matched {
            let mut expected: Vec<String> = Vec::new();
            for figure in claimed {
                if !expected.contains(&figure.raw) {
                    expected.push(figure.raw);
                }
            }
            return Err(GroundingFailure::FigureMismatch { expected });
        }
    }

    Ok(quote.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_verbatim_quote() {
        let page = "In our survey, 81% of users agreed with the change.";
        let quote = check_grounding(
            Some("81% of users agreed"),
            page,
            "According to a study 81% of users agreed.",
        )
        .unwrap();
        assert_eq!(quote, "81% of users agreed");
    }

    #[test]
    fn test_altered_quote_not_found() {
        let result = check_grounding(
            Some("Sales rose 80% last year."),
            "Sales rose 79% last year.",
            "Sales rose 80% last year, per the report.",
        );
        assert_eq!(result, Err(GroundingFailure::QuoteNotFound));
    }

    #[test]
    fn test_figure_mismatch() {
        let result = check_grounding(
            Some("Sales rose 70% last year."),
            "Sales rose 70% last year.",
            "Sales rose 79% last year, per the report.",
        );
        assert_eq!(
            result,
            Err(GroundingFailure::FigureMismatch {
                expected: vec!["79%".to_string()]
            })
        );
    }

    #[test]
    fn test_embedded_digits_do_not_match() {
        let result = check_grounding(
            Some("The company was founded in 1979"),
            "The company was founded in 1979 in Ohio.",
            "Roughly 79 stores opened.",
        );
        assert!(matches!(result, Err(GroundingFailure::FigureMismatch { .. })));
    }

    #[test]
    fn test_percent_and_plain_compare_by_value() {
        let result = check_grounding(
            Some("a rate of 79 percent"),
            "Officials cited a rate of 79 percent nationwide.",
            "The rate reached 79%.",
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_missing_or_blank_quote() {
        assert_eq!(
            check_grounding(None, "page", "ctx"),
            Err(GroundingFailure::MissingQuote)
        );
        assert_eq!(
            check_grounding(Some("  \"\" "), "page", "ctx"),
            Err(GroundingFailure::MissingQuote)
        );
    }

    #[test]
    fn test_whitespace_case_and_typographic_quotes() {
        let page = "The CEO said \u{201C}growth   was STRONG\u{201D} this quarter.";
        let result = check_grounding(Some("\"growth was strong\""), page, "Growth was strong.");
        assert!(result.is_ok());
    }

    #[test]
    fn test_no_figures_in_claim_skips_figure_check() {
        let result = check_grounding(
            Some("remote work is here to stay"),
            "Experts agree remote work is here to stay.",
            "Many argue remote work is here to stay.",
        );
        assert!(result.is_ok());
    }
}
