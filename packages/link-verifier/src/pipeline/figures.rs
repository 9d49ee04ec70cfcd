//! Numeric tokens and figures.
//!
//! A number token is either a thousands-separated run (`1,250,000`) or a
//! plain digit run, each with an optional decimal part and trailing `%`.
//! Digit runs are consumed whole, so `79` is never found inside `1979`.

use regex::Regex;
use std::sync::LazyLock;

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,3}(?:,\d{3})+(?:\.\d+)?%?|\d+(?:\.\d+)?%?").expect("valid number regex")
});

/// A number compared by value, with its percent flag kept for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub raw: String,
    pub value: f64,
    pub percent: bool,
}

impl Figure {
    /// Parse a number token such as `81%`, `1,200` or `3.5`.
    pub fn parse(token: &str) -> Option<Self> {
        let percent = token.ends_with('%');
        let value = normalize_number(token).parse::<f64>().ok()?;
        Some(Self {
            raw: token.to_string(),
            value,
            percent,
        })
    }

    /// Same quantity, regardless of formatting.
    pub fn same_value(&self, other: &Figure) -> bool {
        (self.value - other.value).abs() < 1e-9
    }
}

/// Number tokens in order of appearance, duplicates removed.
pub fn extract_numbers(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for m in NUMBER_RE.find_iter(text) {
        let token = m.as_str().to_string();
        if !seen.contains(&token) {
            seen.push(token);
        }
    }
    seen
}

/// Figures in order of appearance.
pub fn extract_figures(text: &str) -> Vec<Figure> {
    NUMBER_RE
        .find_iter(text)
        .filter_map(|m| Figure::parse(m.as_str()))
        .collect()
}

/// Strip thousands separators and a trailing percent sign.
pub fn normalize_number(token: &str) -> String {
    token.trim_end_matches('%').replace(',', "")
}

/// Whether the text contains an ASCII digit.
pub fn has_digit(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}
