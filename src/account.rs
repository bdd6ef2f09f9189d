use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountEventKind {
    Debited,
    Credited,
}

#[derive(Debug)]
pub struct AccountEvent {
    amount: Decimal,
    kind: AccountEventKind,
}

impl AccountEvent {
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn kind(&self) -> AccountEventKind {
        self.kind
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("balance overflow")]
    BalanceOverflow,
}

#[derive(Debug, Clone)]
pub struct Account {
    secret: String,
    balance: Decimal,
}

impl Account {
    pub fn new(secret: impl Into<String>, balance: Decimal) -> Self {
        Self {
            secret: secret.into(),
            balance,
        }
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn secret_matches(&self, secret: &str) -> bool {
        self.secret == secret
    }

    pub fn apply(&mut self, event: &AccountEvent) {
        match event.kind {
            AccountEventKind::Debited => {
                self.balance -= event.amount;
            }
            AccountEventKind::Credited => {
                self.balance += event.amount;
            }
        }
        debug_assert!(
            !self.balance.is_sign_negative() || self.balance.is_zero(),
            "balance went negative: {}",
            self.balance
        );
    }

    pub fn handle_debit(&self, amount: Decimal) -> Result<AccountEvent, AccountError> {
        if self.balance >= amount {
            Ok(AccountEvent {
                amount,
                kind: AccountEventKind::Debited,
            })
        } else {
            Err(AccountError::InsufficientFunds)
        }
    }

    pub fn handle_credit(&self, amount: Decimal) -> Result<AccountEvent, AccountError> {
        // applying must not panic later, so overflow is rejected here
        match self.balance.checked_add(amount) {
            Some(_) => Ok(AccountEvent {
                amount,
                kind: AccountEventKind::Credited,
            }),
            None => Err(AccountError::BalanceOverflow),
        }
    }
}
