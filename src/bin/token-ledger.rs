use std::sync::Arc;

use anyhow::{Context, Result};
use token_ledger::{
    api::{self, AppState},
    config::Config,
    ledger::in_memory::InMemoryLedger,
    token::TokenCodec,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "token_ledger=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    if config.insecure_secret {
        warn!("USING THE DEVELOPMENT SECRET KEY, tokens can be forged by anyone. Set SECRET_KEY outside of local development");
    }

    let state = AppState::new(
        Arc::new(InMemoryLedger::demo()),
        TokenCodec::new(&config.secret_key),
        config.token_ttl,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind `{}`", config.bind_addr))?;
    info!("listening on {}", config.bind_addr);

    axum::serve(listener, api::router(state))
        .await
        .context("Server failed")
}
