use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors answered to clients as `{"error": "..."}`. Relayed upstream
/// statuses also carry `upstream_status` so callers can tell them apart
/// from the proxy's own failures.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("{0}")]
    BadRequest(String),

    /// Upstream answered with a non-success status; relayed as-is.
    #[error("Upstream returned {status}")]
    Upstream { status: u16 },

    #[error("Upstream request timed out")]
    Timeout,

    #[error("Could not connect to upstream: {0}")]
    Connect(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream { status } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ProxyError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Connect(_) => StatusCode::BAD_GATEWAY,
            ProxyError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProxyError::Timeout
        } else if e.is_connect() {
            ProxyError::Connect(e.to_string())
        } else {
            ProxyError::Internal(e.to_string())
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        }
        let body = match &self {
            ProxyError::Upstream { status } => {
                json!({ "error": self.to_string(), "upstream_status": status })
            }
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ProxyError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ProxyError::Upstream { status: 404 }.status(), StatusCode::NOT_FOUND);
        assert_eq!(ProxyError::Upstream { status: 1000 }.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(ProxyError::Timeout.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            ProxyError::NotConfigured("OPENAI_API_KEY").status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn test_only_relayed_statuses_carry_upstream_status() {
        async fn body_of(err: ProxyError) -> serde_json::Value {
            let bytes = axum::body::to_bytes(err.into_response().into_body(), usize::MAX)
                .await
                .unwrap();
            serde_json::from_slice(&bytes).unwrap()
        }

        let relayed = body_of(ProxyError::Upstream { status: 410 }).await;
        assert_eq!(relayed["upstream_status"], 410);

        let timeout = body_of(ProxyError::Timeout).await;
        assert_eq!(timeout["error"], "Upstream request timed out");
        assert!(timeout.get("upstream_status").is_none());

        let internal = body_of(ProxyError::Internal("decode".into())).await;
        assert!(internal.get("upstream_status").is_none());
    }

    #[test]
    fn test_upstream_message() {
        assert_eq!(
            ProxyError::Upstream { status: 403 }.to_string(),
            "Upstream returned 403"
        );
    }
}
