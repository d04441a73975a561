//! HTTP surface: routes, rate limit middleware and server.

mod error;
mod handlers;
mod middleware;
mod server;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::ledger::TransactionStore;
use crate::ratelimit::RateLimiter;

pub use error::ApiError;
pub use middleware::{client_id, rate_limit_middleware, UNKNOWN_CLIENT};
pub use server::HttpServer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<RateLimiter>,
    pub store: Arc<dyn TransactionStore>,
}

impl AppState {
    pub fn new(limiter: Arc<RateLimiter>, store: Arc<dyn TransactionStore>) -> Self {
        Self { limiter, store }
    }
}

/// Build the application router with rate limiting applied to every route.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route(
            "/transactions/{id}",
            get(handlers::get_transaction)
                .put(handlers::update_transaction)
                .delete(handlers::delete_transaction),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}
