//! Fetch-phase records.

use serde::{Deserialize, Serialize};

/// Message recorded when page text could not be retrieved.
pub const CONTENT_UNAVAILABLE: &str = "Content unavailable";

/// An outbound link sampled from a fetched page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    #[serde(default)]
    pub text: String,
    pub url: String,
}

impl PageLink {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }
}

/// Extracted page text and link sample, already capped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    pub text: String,
    pub links: Vec<PageLink>,
}

/// Outcome of the liveness probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpStatus {
    pub ok: bool,

    /// `None` when the probe failed and the status is unknown
    pub code: Option<u16>,

    pub redirect_url: Option<String>,

    /// Human status phrase ("OK", "Not Found", ...)
    pub message: String,
}

impl HttpStatus {
    /// Classify an HTTP status code. Codes in `[200, 400)` are ok.
    pub fn from_code(code: u16, redirect_url: Option<String>) -> Self {
        let ok = (200..400).contains(&code);
        Self {
            ok,
            code: Some(code),
            redirect_url,
            message: if ok {
                "OK".to_string()
            } else {
                status_phrase(code).to_string()
            },
        }
    }

    /// Probe failed; assume the link works so verification is not blocked.
    pub fn unknown() -> Self {
        Self {
            ok: true,
            code: None,
            redirect_url: None,
            message: "Unknown".to_string(),
        }
    }

    /// "HTTP 404 (Not Found)" style description.
    pub fn describe(&self) -> String {
        match self.code {
            Some(code) => format!("HTTP {} ({})", code, self.message),
            None => format!("HTTP status unknown ({})", self.message),
        }
    }
}

/// Phrase for a failing status code.
pub fn status_phrase(code: u16) -> &'static str {
    match code {
        404 => "Not Found",
        403 => "Forbidden",
        500 => "Server Error",
        _ => "Unknown",
    }
}

/// Per-link result of the fetch phase, consumed by the verify phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedData {
    pub http_status: HttpStatus,
    pub page_content: Option<PageContent>,

    /// Non-fatal problem (HTTP failure description or "Content unavailable")
    pub error: Option<String>,

    /// The fetch itself faulted unexpectedly
    pub fault: Option<String>,
}

impl FetchedData {
    pub fn page(http_status: HttpStatus, content: PageContent) -> Self {
        Self {
            http_status,
            page_content: Some(content),
            error: None,
            fault: None,
        }
    }

    /// Status known, but no page text.
    pub fn without_content(http_status: HttpStatus, error: impl Into<String>) -> Self {
        Self {
            http_status,
            page_content: None,
            error: Some(error.into()),
            fault: None,
        }
    }

    /// The fetch task failed before producing anything.
    pub fn faulted(message: impl Into<String>) -> Self {
        Self {
            http_status: HttpStatus::unknown(),
            page_content: None,
            error: Some(CONTENT_UNAVAILABLE.to_string()),
            fault: Some(message.into()),
        }
    }
}
