use axum::{
    extract::{Query, State},
    Json,
};
use reqwest::header::CONTENT_TYPE;
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use crate::app::AppState;
use crate::error::ProxyError;
use crate::extract::{extract_links, extract_text, ExtractedLink};

#[derive(Debug, Deserialize)]
pub struct FetchParams {
    url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FetchResponse {
    pub text: String,
    pub links: Vec<ExtractedLink>,
    pub status: FetchStatus,
}

#[derive(Debug, Serialize)]
pub struct FetchStatus {
    /// URL after redirects
    pub url: String,
    pub content_type: String,
    pub http_code: u16,
}

/// Fetch a page and return its readable text and outbound links.
///
/// Upstream failures are answered with the upstream status and an
/// `{"error"}` body so callers can tell a dead link from a dead proxy.
pub async fn fetch_handler(
    State(state): State<AppState>,
    Query(params): Query<FetchParams>,
) -> Result<Json<FetchResponse>, ProxyError> {
    let target = parse_target(params.url.as_deref())?;
    let start = Instant::now();

    let response = state.http.get(target.clone()).send().await.map_err(|e| {
        warn!(url = %target, error = %e, "Upstream fetch failed");
        ProxyError::from(e)
    })?;

    let http_code = response.status().as_u16();
    if !response.status().is_success() {
        info!(url = %target, status = http_code, "Upstream returned failure status");
        return Err(ProxyError::Upstream { status: http_code });
    }

    let final_url = response.url().clone();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let body = response.text().await.map_err(ProxyError::from)?;
    let max_chars = state.config.max_text_chars;

    let (text, links) = if is_html(&content_type) {
        let document = Html::parse_document(&body);
        (
            extract_text(&document, max_chars),
            extract_links(&document, &final_url),
        )
    } else {
        (body.trim().chars().take(max_chars).collect(), Vec::new())
    };

    debug!(
        url = %target,
        final_url = %final_url,
        chars = text.chars().count(),
        links = links.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Fetched page"
    );

    Ok(Json(FetchResponse {
        text,
        links,
        status: FetchStatus {
            url: final_url.to_string(),
            content_type,
            http_code,
        },
    }))
}

fn parse_target(raw: Option<&str>) -> Result<Url, ProxyError> {
    let raw = raw
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ProxyError::BadRequest("Missing url parameter".into()))?;

    Url::parse(raw)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .ok_or_else(|| ProxyError::BadRequest(format!("Invalid url parameter: {}", raw)))
}

/// Servers that omit the content type usually send HTML.
fn is_html(content_type: &str) -> bool {
    content_type.is_empty() || content_type.contains("html")
}
