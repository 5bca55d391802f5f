use std::collections::BTreeMap;
use std::fmt;

use attesta_core::Did;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Either side of a ledger movement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Party {
    /// The system pool minted by bootstrap. Also where consumed credits go.
    Pool,
    /// An identity's account.
    Identity(Did),
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pool => write!(f, "pool"),
            Self::Identity(did) => write!(f, "{}", did),
        }
    }
}

impl From<Did> for Party {
    fn from(did: Did) -> Self {
        Self::Identity(did)
    }
}

impl From<&Did> for Party {
    fn from(did: &Did) -> Self {
        Self::Identity(did.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Credit,
    Debit,
}

/// One history entry. Entries are appended and never edited or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    /// Positive for credits, negative for debits.
    pub delta: i64,
    pub description: String,
    /// The other side of the movement, `pool` or a DID.
    pub counterparty: String,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub(crate) fn credit(
        amount: i64,
        description: &str,
        counterparty: &Party,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind: TransactionKind::Credit,
            delta: amount,
            description: description.to_string(),
            counterparty: counterparty.to_string(),
            timestamp,
        }
    }

    pub(crate) fn debit(
        amount: i64,
        description: &str,
        counterparty: &Party,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind: TransactionKind::Debit,
            delta: -amount,
            description: description.to_string(),
            counterparty: counterparty.to_string(),
            timestamp,
        }
    }
}

/// Balance plus chronological history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub balance: u64,
    #[serde(default)]
    pub history: Vec<Transaction>,
}

/// The whole ledger aggregate as persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct LedgerState {
    pub bootstrapped: bool,
    pub pool: Account,
    /// Keyed by DID string.
    #[serde(default)]
    pub accounts: BTreeMap<String, Account>,
}

impl LedgerState {
    pub fn account(&self, party: &Party) -> Option<&Account> {
        match party {
            Party::Pool => Some(&self.pool),
            Party::Identity(did) => self.accounts.get(did.uri()),
        }
    }

    pub fn account_mut(&mut self, party: &Party) -> Option<&mut Account> {
        match party {
            Party::Pool => Some(&mut self.pool),
            Party::Identity(did) => self.accounts.get_mut(did.uri()),
        }
    }

    /// Pool plus every account balance.
    pub fn total_supply(&self) -> u128 {
        self.accounts
            .values()
            .fold(u128::from(self.pool.balance), |sum, a| sum + u128::from(a.balance))
    }
}
