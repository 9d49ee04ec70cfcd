// HTTP routes
pub mod chat;
pub mod fetch;
pub mod health;

pub use chat::*;
pub use fetch::*;
pub use health::*;

use crate::error::ProxyError;

/// Fallback for methods a route does not serve.
pub async fn method_not_allowed() -> ProxyError {
    ProxyError::MethodNotAllowed
}
