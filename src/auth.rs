use thiserror::Error;
use tracing::debug;

use crate::{ledger::AccountId, token::TokenCodec};

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Covers bad signatures, expiry and garbage alike.
    #[error("invalid or expired token")]
    InvalidToken,
}

/// Accepts either `Bearer <token>` or a bare token.
pub fn extract_token(raw: &str) -> &str {
    raw.strip_prefix(BEARER_PREFIX).unwrap_or(raw)
}

/// Resolves an `Authorization` header value to the caller's account id.
pub fn authorize(codec: &TokenCodec, raw: &str) -> Result<AccountId, AuthError> {
    codec.verify(extract_token(raw)).map_err(|err| {
        debug!("rejected token: {err}");
        AuthError::InvalidToken
    })
}
