use base64::{Engine as _, engine::general_purpose::URL_SAFE};
use chrono::{DateTime, TimeDelta, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 output length.
const SIGNATURE_LEN: usize = 32;
const SEPARATOR: u8 = b'.';

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    #[error("token lifetime reaches past the supported date range")]
    ExpiryOutOfRange,
    /// HMAC takes keys of any length, so this only mirrors the fallible
    /// `new_from_slice` signature and is never produced in practice.
    #[error("secret key cannot be used for signing")]
    InvalidKey,
    #[error("failed to encode token payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Signed payload. Field order here is the serialized order, which keeps
/// the encoding canonical.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// Issues and verifies `base64url(payload "." hmac)` tokens.
pub struct TokenCodec {
    secret: Vec<u8>,
}

impl TokenCodec {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    pub fn issue(&self, subject: &str, ttl: TimeDelta) -> Result<String, TokenError> {
        self.issue_at(subject, ttl, Utc::now())
    }

    pub fn issue_at(
        &self,
        subject: &str,
        ttl: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or(TokenError::ExpiryOutOfRange)?;
        let claims = Claims {
            sub: subject.to_owned(),
            exp: expires_at.timestamp(),
        };
        let mut raw = serde_json::to_vec(&claims)?;
        let signature = self.sign(&raw)?;
        raw.push(SEPARATOR);
        raw.extend_from_slice(&signature);
        Ok(URL_SAFE.encode(raw))
    }

    /// Returns the token subject if the signature is intact and the token
    /// has not expired.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let decoded = URL_SAFE
            .decode(token.as_bytes())
            .map_err(|_| TokenError::Malformed)?;
        let (payload, signature) = split_envelope(&decoded)?;

        let mut mac = self.mac()?;
        mac.update(payload);
        // verify_slice compares in constant time.
        mac.verify_slice(signature).map_err(|_| TokenError::BadSignature)?;

        let claims: Claims =
            serde_json::from_slice(payload).map_err(|_| TokenError::Malformed)?;
        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims.sub)
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::InvalidKey)
    }

    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, TokenError> {
        let mut mac = self.mac()?;
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

// The signature is raw bytes and may itself contain the separator, so the
// envelope is split by length rather than by searching for '.'.
fn split_envelope(decoded: &[u8]) -> Result<(&[u8], &[u8]), TokenError> {
    let payload_len = decoded
        .len()
        .checked_sub(SIGNATURE_LEN + 1)
        .filter(|len| *len > 0)
        .ok_or(TokenError::Malformed)?;
    let (payload, rest) = decoded.split_at(payload_len);
    match rest.split_first() {
        Some((&SEPARATOR, signature)) => Ok((payload, signature)),
        _ => Err(TokenError::Malformed),
    }
}
