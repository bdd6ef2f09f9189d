use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{auth::authorize, ledger::AccountId};

use super::{ApiError, AppState};

/// Account id resolved from the request's bearer token. Handlers that take
/// a `Caller` never run for unauthenticated requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub AccountId);

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // a missing or non-ascii header is just an empty token
        let raw = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        Ok(Caller(authorize(&state.codec, raw)?))
    }
}
