use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::{account::Account, command::TransferCommand};

use super::{AccountId, Ledger, LedgerError, TransferReceipt};

#[derive(Default)]
pub struct InMemoryLedger {
    accounts: Mutex<HashMap<AccountId, Account>>,
}

impl InMemoryLedger {
    pub fn with_accounts<I, K>(accounts: I) -> Self
    where
        I: IntoIterator<Item = (K, Account)>,
        K: Into<AccountId>,
    {
        Self {
            accounts: Mutex::new(
                accounts
                    .into_iter()
                    .map(|(id, acc)| (id.into(), acc))
                    .collect(),
            ),
        }
    }

    /// Seed accounts the service starts with.
    pub fn demo() -> Self {
        Self::with_accounts([
            ("alice", Account::new("password1", Decimal::from(1000))),
            ("bob", Account::new("password2", Decimal::from(500))),
        ])
    }

    // Poisoning is ignored: a transfer writes nothing until both of its
    // events have been computed.
    fn accounts(&self) -> MutexGuard<'_, HashMap<AccountId, Account>> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Ledger for InMemoryLedger {
    fn authenticate(&self, id: &str, secret: &str) -> Result<(), LedgerError> {
        match self.accounts().get(id) {
            Some(acc) if acc.secret_matches(secret) => Ok(()),
            _ => Err(LedgerError::InvalidCredentials),
        }
    }

    fn balance(&self, id: &str) -> Result<Decimal, LedgerError> {
        self.accounts()
            .get(id)
            .map(Account::balance)
            .ok_or(LedgerError::NotFound)
    }

    fn transfer(
        &self,
        from: &str,
        to: &str,
        amount: Decimal,
    ) -> Result<TransferReceipt, LedgerError> {
        let cmd = TransferCommand::parse(from, to, amount)?;

        // single critical section for check, debit and credit
        let mut accounts = self.accounts();
        let (Some(source), Some(destination)) = (accounts.get(&cmd.from), accounts.get(&cmd.to))
        else {
            warn!(from = %cmd.from, to = %cmd.to, "transfer between unknown accounts");
            return Err(LedgerError::InvalidAccount);
        };

        let debit = source.handle_debit(cmd.amount).inspect_err(|err| {
            warn!(from = %cmd.from, amount = %cmd.amount, "transfer rejected: {err}");
        })?;
        let credit = destination.handle_credit(cmd.amount)?;

        for (id, event) in [(&cmd.from, &debit), (&cmd.to, &credit)] {
            if let Some(acc) = accounts.get_mut(id) {
                debug!(account = %id, kind = ?event.kind(), amount = %event.amount(), "applying event");
                acc.apply(event);
            }
        }
        drop(accounts);

        info!(from = %cmd.from, to = %cmd.to, amount = %cmd.amount, "transfer completed");
        Ok(TransferReceipt {
            from: cmd.from,
            to: cmd.to,
            amount: cmd.amount,
        })
    }

    fn total_balance(&self) -> Decimal {
        self.accounts().values().map(Account::balance).sum()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Barrier},
        thread,
    };

    use rust_decimal::prelude::{FromPrimitive, Zero};

    use crate::{account::AccountError, command::TransferCommandError};

    use super::*;

    fn dec(value: i64) -> Decimal {
        Decimal::from_i64(value).unwrap()
    }

    #[test]
    fn authenticate_accounts() {
        let ledger = InMemoryLedger::demo();
        assert!(ledger.authenticate("alice", "password1").is_ok());
        assert!(ledger.authenticate("bob", "password2").is_ok());
        assert_eq!(
            ledger.authenticate("alice", "password2").unwrap_err(),
            LedgerError::InvalidCredentials
        );
        assert_eq!(
            ledger.authenticate("carol", "password1").unwrap_err(),
            LedgerError::InvalidCredentials
        );
    }

    #[test]
    fn read_balances() {
        let ledger = InMemoryLedger::demo();
        assert_eq!(ledger.balance("alice").unwrap(), dec(1000));
        assert_eq!(ledger.balance("bob").unwrap(), dec(500));
        assert_eq!(ledger.balance("carol").unwrap_err(), LedgerError::NotFound);
        assert_eq!(ledger.total_balance(), dec(1500));
    }

    #[test]
    fn process_some_transfers() {
        let ledger = InMemoryLedger::demo();

        let receipt = ledger.transfer("alice", "bob", dec(10)).unwrap();
        assert_eq!(
            receipt,
            TransferReceipt {
                from: "alice".to_owned(),
                to: "bob".to_owned(),
                amount: dec(10),
            }
        );
        assert_eq!(ledger.balance("alice").unwrap(), dec(990));
        assert_eq!(ledger.balance("bob").unwrap(), dec(510));

        ledger.transfer("bob", "alice", Decimal::new(2575, 2)).unwrap();
        assert_eq!(ledger.balance("alice").unwrap(), Decimal::new(101575, 2));
        assert_eq!(ledger.balance("bob").unwrap(), Decimal::new(48425, 2));
        assert_eq!(ledger.total_balance(), dec(1500));

        // source can be drained to zero
        ledger.transfer("bob", "alice", Decimal::new(48425, 2)).unwrap();
        assert_eq!(ledger.balance("bob").unwrap(), Decimal::zero());
        assert_eq!(ledger.total_balance(), dec(1500));
    }

    #[test]
    fn rejected_transfers_leave_balances_unchanged() {
        let ledger = InMemoryLedger::demo();
        let cases = [
            (
                "alice",
                "bob",
                dec(0),
                LedgerError::CommandErr(TransferCommandError::InvalidAmount),
            ),
            (
                "alice",
                "bob",
                dec(-5),
                LedgerError::CommandErr(TransferCommandError::InvalidAmount),
            ),
            (
                "alice",
                "alice",
                dec(5),
                LedgerError::CommandErr(TransferCommandError::SameAccount),
            ),
            ("alice", "carol", dec(5), LedgerError::InvalidAccount),
            ("carol", "bob", dec(5), LedgerError::InvalidAccount),
            // unknown account wins over insufficient funds
            ("alice", "carol", dec(5000), LedgerError::InvalidAccount),
            (
                "alice",
                "bob",
                dec(1001),
                LedgerError::AccountErr(AccountError::InsufficientFunds),
            ),
        ];

        for (from, to, amount, expected) in cases {
            let err = ledger.transfer(from, to, amount).unwrap_err();
            assert_eq!(err, expected, "transfer {from} -> {to} of {amount}");
            assert_eq!(ledger.balance("alice").unwrap(), dec(1000));
            assert_eq!(ledger.balance("bob").unwrap(), dec(500));
        }
    }

    #[test]
    fn credit_overflow_is_rejected_without_debit() {
        let ledger = InMemoryLedger::with_accounts([
            ("rich", Account::new("pw", Decimal::MAX)),
            ("poor", Account::new("pw", dec(10))),
        ]);
        let err = ledger.transfer("poor", "rich", dec(10)).unwrap_err();
        assert_eq!(err, LedgerError::AccountErr(AccountError::BalanceOverflow));
        assert_eq!(ledger.balance("poor").unwrap(), dec(10));
    }

    #[test]
    fn concurrent_overdraft_allows_one_transfer() {
        let ledger = Arc::new(InMemoryLedger::demo());
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let ledger = ledger.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    ledger.transfer("alice", "bob", dec(600))
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(LedgerError::AccountErr(AccountError::InsufficientFunds))
        )));
        assert_eq!(ledger.balance("alice").unwrap(), dec(400));
        assert_eq!(ledger.balance("bob").unwrap(), dec(1100));
    }

    #[test]
    fn many_concurrent_transfers_conserve_total() {
        let ledger = Arc::new(InMemoryLedger::demo());
        thread::scope(|s| {
            for i in 0..8 {
                let ledger = &ledger;
                s.spawn(move || {
                    let (from, to) = if i % 2 == 0 {
                        ("alice", "bob")
                    } else {
                        ("bob", "alice")
                    };
                    for _ in 0..200 {
                        // some of these fail on funds, that's fine
                        let _ = ledger.transfer(from, to, Decimal::new(735, 2));
                    }
                });
            }
        });
        assert_eq!(ledger.total_balance(), dec(1500));
        assert!(ledger.balance("alice").unwrap() >= Decimal::zero());
        assert!(ledger.balance("bob").unwrap() >= Decimal::zero());
    }
}
