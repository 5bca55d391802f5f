//! Attesta Ledger: metered platform credits.
//!
//! A system pool plus one account per identity. Every mutation either fully
//! applies or leaves the ledger untouched, and value only enters through
//! bootstrap or recharge.

pub mod error;
pub mod ledger;
pub mod types;

pub use error::LedgerError;
pub use ledger::{CreditLedger, LEDGER_KEY};
pub use types::{Account, Party, Transaction, TransactionKind};
