//! Link records and their verification lifecycle.

use serde::{Deserialize, Serialize};

/// Where a link is in its verification lifecycle.
///
/// Progresses `Pending -> Fetching -> Checking -> {Verified | Invalid | Inaccurate}`
/// and never moves backwards within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Pending,
    Fetching,
    Checking,
    Verified,
    Invalid,
    Inaccurate,
}

impl LinkStatus {
    /// Terminal states end the link's run.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Verified | Self::Invalid | Self::Inaccurate)
    }

    fn phase(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Fetching => 1,
            Self::Checking => 2,
            Self::Verified | Self::Invalid | Self::Inaccurate => 3,
        }
    }

    /// Whether moving from `self` to `next` keeps the status monotonic.
    pub fn can_advance_to(self, next: LinkStatus) -> bool {
        next.phase() > self.phase()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Checking => "checking",
            Self::Verified => "verified",
            Self::Invalid => "invalid",
            Self::Inaccurate => "inaccurate",
        }
    }
}

impl std::fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric-token features of the sentence containing a link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkFeatures {
    /// The anchor text itself carries a digit or a percent sign
    pub anchor_has_number: bool,

    /// The containing sentence carries at least one number
    pub sentence_has_number: bool,

    /// Numbers inside this link's anchor text
    pub anchor_numbers: Vec<String>,

    /// Numbers inside any anchor text of the same sentence
    pub sentence_anchor_numbers: Vec<String>,

    /// Every number in the sentence (anchors included)
    pub sentence_numbers: Vec<String>,

    /// Sentence numbers not claimed by any anchor in the sentence
    pub unlinked_numbers: Vec<String>,
}

/// One hyperlink occurrence found in the source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// Anchor label
    pub text: String,

    /// Target as written in the source
    pub url: String,

    /// Containing sentence plus short neighbours, at most 360 characters
    pub context: String,

    /// The single sentence containing the link, with link syntax stripped
    pub sentence: String,

    pub features: LinkFeatures,

    pub is_citation: bool,

    pub status: LinkStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact_quote: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

impl Link {
    /// Create a pending, unclassified link.
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
            context: String::new(),
            sentence: String::new(),
            features: LinkFeatures::default(),
            is_citation: false,
            status: LinkStatus::Pending,
            analysis: None,
            suggested_url: None,
            exact_quote: None,
            redirect_url: None,
        }
    }

    /// Set the context snippet.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Set the containing sentence.
    pub fn with_sentence(mut self, sentence: impl Into<String>) -> Self {
        self.sentence = sentence.into();
        self
    }

    /// Set the numeric features.
    pub fn with_features(mut self, features: LinkFeatures) -> Self {
        self.features = features;
        self
    }

    /// Mark as citation or regular link.
    pub fn with_citation(mut self, is_citation: bool) -> Self {
        self.is_citation = is_citation;
        self
    }

    /// Copy a verification outcome onto the link.
    ///
    /// Returns `false` (and leaves the link untouched) when the result would
    /// move the status backwards.
    pub fn apply(&mut self, result: &VerificationResult) -> bool {
        if !self.status.can_advance_to(result.status) {
            return false;
        }
        self.status = result.status;
        self.analysis = result.analysis.clone();
        self.suggested_url = result.suggested_url.clone();
        self.exact_quote = result.exact_quote.clone();
        self.redirect_url = result.redirect_url.clone();
        true
    }
}

/// Output record per link, relayed to the renderer.
///
/// Progress updates (`fetching`, `checking`) carry no analysis; the terminal
/// update carries the explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub original_url: String,
    pub link_text: String,
    pub context: String,
    pub is_citation: bool,
    pub status: LinkStatus,
    pub analysis: Option<String>,
    pub suggested_url: Option<String>,
    pub exact_quote: Option<String>,
    pub redirect_url: Option<String>,
}

impl VerificationResult {
    /// Progress update for a link entering a phase.
    pub fn progress(link: &Link, status: LinkStatus) -> Self {
        Self {
            original_url: link.url.clone(),
            link_text: link.text.clone(),
            context: link.context.clone(),
            is_citation: link.is_citation,
            status,
            analysis: None,
            suggested_url: None,
            exact_quote: None,
            redirect_url: None,
        }
    }

    /// Terminal outcome with an explanation.
    pub fn terminal(link: &Link, status: LinkStatus, analysis: impl Into<String>) -> Self {
        Self {
            analysis: Some(analysis.into()),
            ..Self::progress(link, status)
        }
    }

    pub fn with_quote(mut self, quote: impl Into<String>) -> Self {
        self.exact_quote = Some(quote.into());
        self
    }

    pub fn with_suggested_url(mut self, url: Option<String>) -> Self {
        self.suggested_url = url;
        self
    }

    pub fn with_redirect(mut self, redirect_url: Option<String>) -> Self {
        self.redirect_url = redirect_url;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_monotonic() {
        use LinkStatus::*;

        assert!(Pending.can_advance_to(Fetching));
        assert!(Fetching.can_advance_to(Checking));
        assert!(Checking.can_advance_to(Verified));
        assert!(Pending.can_advance_to(Invalid));

        assert!(!Checking.can_advance_to(Fetching));
        assert!(!Verified.can_advance_to(Inaccurate));
        assert!(!Fetching.can_advance_to(Fetching));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&LinkStatus::Inaccurate).unwrap();
        assert_eq!(json, "\"inaccurate\"");
    }

    #[test]
    fn test_apply_rejects_regression() {
        let mut link = Link::new("study", "https://example.com");
        link.status = LinkStatus::Checking;

        let back = VerificationResult::progress(&link, LinkStatus::Fetching);
        assert!(!link.apply(&back));
        assert_eq!(link.status, LinkStatus::Checking);

        let done = VerificationResult::terminal(&link, LinkStatus::Verified, "ok")
            .with_quote("81% of users agreed");
        assert!(link.apply(&done));
        assert_eq!(link.status, LinkStatus::Verified);
        assert_eq!(link.exact_quote.as_deref(), Some("81% of users agreed"));
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let link = Link::new("study", "https://example.com").with_citation(true);
        let result = VerificationResult::terminal(&link, LinkStatus::Verified, "ok");
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["originalUrl"], "https://example.com");
        assert_eq!(value["linkText"], "study");
        assert_eq!(value["isCitation"], true);
        assert_eq!(value["status"], "verified");
    }
}
