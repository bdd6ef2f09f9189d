use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::{account::AccountError, command::TransferCommandError};

pub mod in_memory;

pub type AccountId = String;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error(transparent)]
    CommandErr(#[from] TransferCommandError),
    #[error(transparent)]
    AccountErr(#[from] AccountError),
    #[error("invalid account")]
    InvalidAccount,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user not found")]
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferReceipt {
    pub from: AccountId,
    pub to: AccountId,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

pub trait Ledger: Send + Sync {
    /// Succeeds only when the account exists and `secret` matches exactly.
    fn authenticate(&self, id: &str, secret: &str) -> Result<(), LedgerError>;

    fn balance(&self, id: &str) -> Result<Decimal, LedgerError>;

    /// Moves `amount` from one account to another. Either both sides are
    /// updated or neither is.
    fn transfer(&self, from: &str, to: &str, amount: Decimal)
    -> Result<TransferReceipt, LedgerError>;

    fn total_balance(&self) -> Decimal;
}
