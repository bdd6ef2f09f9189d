use std::net::SocketAddr;

use chrono::{TimeDelta, Utc};
use thiserror::Error;

pub const SECRET_KEY_VAR: &str = "SECRET_KEY";
pub const DEV_SECRET_VAR: &str = "TOKEN_LEDGER_DEV_SECRET";
pub const BIND_ADDR_VAR: &str = "BIND_ADDR";
pub const TOKEN_TTL_VAR: &str = "TOKEN_TTL_SECS";

/// Well known secret, only for local development.
pub const DEV_SECRET: &str = "dev-secret";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SECRET_KEY is not set (set TOKEN_LEDGER_DEV_SECRET=1 to use the development secret)")]
    MissingSecret,
    #[error("invalid value for {key}: `{value}`")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub secret_key: String,
    /// `true` when running with [`DEV_SECRET`].
    pub insecure_secret: bool,
    pub token_ttl: TimeDelta,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (secret_key, insecure_secret) = match lookup(SECRET_KEY_VAR) {
            Some(secret) if !secret.is_empty() => (secret, false),
            _ if is_enabled(lookup(DEV_SECRET_VAR)) => (DEV_SECRET.to_owned(), true),
            _ => return Err(ConfigError::MissingSecret),
        };

        let bind_addr = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                key: BIND_ADDR_VAR,
                value: bind_addr.clone(),
            })?;

        let token_ttl = match lookup(TOKEN_TTL_VAR) {
            None => TimeDelta::seconds(DEFAULT_TOKEN_TTL_SECS),
            Some(value) => value
                .parse::<i64>()
                .ok()
                .filter(|secs| *secs > 0)
                .and_then(TimeDelta::try_seconds)
                // tokens issued from now on must get a representable expiry
                .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
                .ok_or(ConfigError::InvalidValue {
                    key: TOKEN_TTL_VAR,
                    value,
                })?,
        };

        Ok(Self {
            bind_addr,
            secret_key,
            insecure_secret,
            token_ttl,
        })
    }
}

fn is_enabled(value: Option<String>) -> bool {
    matches!(value.as_deref(), Some("1" | "true" | "yes"))
}
