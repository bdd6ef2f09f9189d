//! HTTP boundary: routing, request parsing and error rendering.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use chrono::TimeDelta;
use tower_http::trace::TraceLayer;

use crate::{ledger::Ledger, token::TokenCodec};

pub mod error;
pub mod extract;
pub mod handlers;

pub use error::ApiError;
pub use extract::Caller;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn Ledger>,
    pub codec: Arc<TokenCodec>,
    pub token_ttl: TimeDelta,
}

impl AppState {
    pub fn new(ledger: Arc<dyn Ledger>, codec: TokenCodec, token_ttl: TimeDelta) -> Self {
        Self {
            ledger,
            codec: Arc::new(codec),
            token_ttl,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/health", get(handlers::health))
        .route("/login", post(handlers::login))
        .route("/balance", get(handlers::balance))
        .route("/transfer", post(handlers::transfer))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
