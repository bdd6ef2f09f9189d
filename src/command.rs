use rust_decimal::{Decimal, prelude::Zero};
use thiserror::Error;

use crate::ledger::AccountId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferCommand {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Decimal,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransferCommandError {
    #[error("invalid amount")]
    InvalidAmount,
    #[error("cannot transfer to the same account")]
    SameAccount,
}

impl TransferCommand {
    /// Validates the parts of a transfer that don't depend on ledger state.
    /// Account existence and funds are checked by the ledger afterwards.
    pub fn parse(
        from: &str,
        to: &str,
        amount: Decimal,
    ) -> Result<Self, TransferCommandError> {
        if amount <= Decimal::zero() {
            return Err(TransferCommandError::InvalidAmount);
        }
        if from == to {
            return Err(TransferCommandError::SameAccount);
        }
        Ok(Self {
            from: from.to_owned(),
            to: to.to_owned(),
            amount,
        })
    }
}
