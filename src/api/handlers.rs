use std::str::FromStr;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::{
    command::TransferCommandError,
    ledger::{AccountId, TransferReceipt},
};

use super::{ApiError, AppState, Caller};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TransferRequest {
    pub to: Option<AccountId>,
    /// Number or numeric string.
    pub amount: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub user: AccountId,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub receipt: TransferReceipt,
}

pub async fn home() -> Json<Value> {
    Json(json!({ "message": "API is running" }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    // an unreadable body is treated like an empty one
    let req = payload.map(|Json(req)| req).unwrap_or_default();
    let (Some(username), Some(password)) = (
        req.username.filter(|u| !u.is_empty()),
        req.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::validation("username and password required"));
    };

    state
        .ledger
        .authenticate(&username, &password)
        .inspect_err(|_| warn!(user = %username, "login failed"))?;

    let token = state.codec.issue(&username, state.token_ttl)?;
    info!(user = %username, "login succeeded");
    Ok(Json(TokenResponse { token }))
}

pub async fn balance(
    State(state): State<AppState>,
    Caller(user): Caller,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state.ledger.balance(&user)?;
    Ok(Json(BalanceResponse { user, balance }))
}

pub async fn transfer(
    State(state): State<AppState>,
    Caller(user): Caller,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<TransferResponse>, ApiError> {
    let req = payload.map(|Json(req)| req).unwrap_or_default();
    let amount = parse_amount(req.amount.as_ref())?;
    // a missing recipient can't match any account
    let to = req.to.unwrap_or_default();

    let receipt = state.ledger.transfer(&user, &to, amount)?;
    Ok(Json(TransferResponse {
        status: "success",
        receipt,
    }))
}

/// Parses the amount exactly, without going through a float. A missing
/// amount is zero, which the ledger then rejects.
fn parse_amount(value: Option<&Value>) -> Result<Decimal, ApiError> {
    let text = match value {
        None | Some(Value::Null) => return Ok(Decimal::ZERO),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::String(text)) => text.trim().to_owned(),
        Some(_) => return Err(invalid_amount()),
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| invalid_amount())
}

fn invalid_amount() -> ApiError {
    ApiError::validation(TransferCommandError::InvalidAmount.to_string())
}
