use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::routes::{
    chat_handler, chat_status, fetch_handler, health_handler, method_not_allowed,
};

/// Browser-like user agent; many sites refuse obvious bots.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Chat completions can take far longer than page fetches.
const CHAT_TIMEOUT: Duration = Duration::from_secs(120);

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Page fetches
    pub http: reqwest::Client,
    /// Chat forwarding
    pub llm: reqwest::Client,
    pub config: Arc<ProxyConfig>,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        let llm = reqwest::Client::builder().timeout(CHAT_TIMEOUT).build()?;

        Ok(Self {
            http,
            llm,
            config: Arc::new(config),
        })
    }
}

/// Build the router with CORS and request tracing applied to every route,
/// error responses included.
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    Router::new()
        // Page fetch, also served at the root for older clients
        .route("/api/fetch", get(fetch_handler).fallback(method_not_allowed))
        .route("/", get(fetch_handler).fallback(method_not_allowed))
        // LLM passthrough
        .route(
            "/api/chat",
            get(chat_status)
                .post(chat_handler)
                .fallback(method_not_allowed),
        )
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
