/// Single account state: credential and balance.
/// State is modified using events, which are created by handling debit/credit requests
pub mod account;

/// Transfer commands that are later executed against [`account`]s by the ledger.
pub mod command;

/// Ledger interface, plus "in memory" implementation.
/// Owns all accounts and runs transfers atomically.
pub mod ledger;

/// Signed, time-boxed bearer tokens.
pub mod token;

/// Resolves a presented `Authorization` value to an account id.
pub mod auth;

/// Settings read from the process environment.
pub mod config;

/// HTTP routes and handlers. Kept in the library so integration tests can
/// drive the router without binding a socket.
pub mod api;
