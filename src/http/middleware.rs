//! Per-client rate limiting middleware.

use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use super::error::ApiError;
use super::AppState;
use crate::ratelimit::Decision;

/// Identifier shared by every request whose origin cannot be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Derive the rate limit key for a request.
///
/// Uses the first entry of `X-Forwarded-For` when present and non-empty,
/// then the peer IP, then [`UNKNOWN_CLIENT`]. The forwarded value is used
/// as-is and is not required to parse as an address.
pub fn client_id(req: &Request) -> String {
    if let Some(first) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty())
    {
        return first.to_string();
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Rate limiting middleware. Returns 429 when the client is over its limit.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let client = client_id(&req);

    match state.limiter.admit(&client, Instant::now()) {
        Decision::Admitted => Ok(next.run(req).await),
        Decision::Rejected { retry_after_secs } => {
            warn!(
                client_id = %client,
                method = %req.method(),
                path = %req.uri().path(),
                retry_after_secs,
                "Rate limit rejected request"
            );
            Err(ApiError::TooManyRequests { retry_after_secs })
        }
    }
}
