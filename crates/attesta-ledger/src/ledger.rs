use std::sync::Arc;

use attesta_core::store::{load, save};
use attesta_core::{Did, Store};
use chrono::Utc;
use tokio::sync::Mutex;

use crate::error::LedgerError;
use crate::types::{Account, LedgerState, Party, Transaction};

/// Store key holding the whole ledger.
pub const LEDGER_KEY: &str = "ledger";

/// Credit ledger over a [`Store`].
///
/// Every mutation runs under one async lock as load → apply → single save.
/// Validation happens before anything is written, so a failed call leaves
/// the stored ledger exactly as it was.
pub struct CreditLedger {
    store: Arc<dyn Store>,
    write_lock: Mutex<()>,
}

impl CreditLedger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    async fn load_state(&self) -> Result<LedgerState, LedgerError> {
        Ok(load(self.store.as_ref(), LEDGER_KEY)
            .await?
            .unwrap_or_default())
    }

    async fn save_state(&self, state: &LedgerState) -> Result<(), LedgerError> {
        save(self.store.as_ref(), LEDGER_KEY, state).await?;
        Ok(())
    }

    /// One-time mint of the system pool.
    pub async fn bootstrap(&self, amount: u64) -> Result<(), LedgerError> {
        let delta = signed_amount(amount)?;
        let _guard = self.write_lock.lock().await;
        let mut state = self.load_state().await?;
        if state.bootstrapped {
            return Err(LedgerError::Validation("ledger already bootstrapped".into()));
        }

        // The pool may already hold recharged credits.
        state.pool.balance = state
            .pool
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Validation("pool balance overflow".into()))?;
        state.bootstrapped = true;
        state
            .pool
            .history
            .push(Transaction::credit(delta, "bootstrap", &Party::Pool, Utc::now()));
        self.save_state(&state).await?;

        tracing::info!(amount, "ledger bootstrapped");
        Ok(())
    }

    /// Mint new credits into an existing account or the pool.
    pub async fn recharge(
        &self,
        party: &Party,
        amount: u64,
        description: &str,
    ) -> Result<u64, LedgerError> {
        let delta = signed_amount(amount)?;
        let _guard = self.write_lock.lock().await;
        let mut state = self.load_state().await?;

        let account = state
            .account_mut(party)
            .ok_or_else(|| LedgerError::NotFound(party.to_string()))?;
        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Validation("balance overflow".into()))?;
        account
            .history
            .push(Transaction::credit(delta, description, &Party::Pool, Utc::now()));
        let balance = account.balance;
        self.save_state(&state).await?;

        tracing::info!(party = %party, amount, "account recharged");
        Ok(balance)
    }

    /// Open a zero-balance account. Returns `false` if it already existed.
    pub async fn open_account(&self, did: &Did) -> Result<bool, LedgerError> {
        let _guard = self.write_lock.lock().await;
        let mut state = self.load_state().await?;
        if state.accounts.contains_key(did.uri()) {
            return Ok(false);
        }
        state.accounts.insert(did.uri().to_string(), Account::default());
        self.save_state(&state).await?;

        tracing::debug!(did = %did, "ledger account opened");
        Ok(true)
    }

    /// Close accounts, returning any remaining balance to the pool. Unknown
    /// DIDs are skipped. Returns the total amount returned.
    pub async fn close_accounts(&self, dids: &[Did]) -> Result<u64, LedgerError> {
        let _guard = self.write_lock.lock().await;
        let mut state = self.load_state().await?;
        let now = Utc::now();
        let mut returned = 0u64;
        let mut closed = 0usize;

        for did in dids {
            let Some(account) = state.accounts.remove(did.uri()) else {
                continue;
            };
            closed += 1;
            if account.balance == 0 {
                continue;
            }
            let delta = signed_amount(account.balance)?;
            state.pool.balance = state
                .pool
                .balance
                .checked_add(account.balance)
                .ok_or_else(|| LedgerError::Validation("pool balance overflow".into()))?;
            state.pool.history.push(Transaction::credit(
                delta,
                "account closed",
                &Party::Identity(did.clone()),
                now,
            ));
            returned += account.balance;
        }

        if closed > 0 {
            self.save_state(&state).await?;
            tracing::info!(closed, returned, "ledger accounts closed");
        }
        Ok(returned)
    }

    /// Move `amount` from one party to another.
    ///
    /// Appends a debit to the source and a credit to the destination with the
    /// same description and timestamp.
    pub async fn transfer(
        &self,
        from: &Party,
        to: &Party,
        amount: u64,
        description: &str,
    ) -> Result<(), LedgerError> {
        let delta = signed_amount(amount)?;
        if from == to {
            return Err(LedgerError::Validation(
                "source and destination must differ".into(),
            ));
        }

        let _guard = self.write_lock.lock().await;
        let mut state = self.load_state().await?;

        let available = state
            .account(from)
            .ok_or_else(|| LedgerError::NotFound(from.to_string()))?
            .balance;
        let to_balance = state
            .account(to)
            .ok_or_else(|| LedgerError::NotFound(to.to_string()))?
            .balance;
        if available < amount {
            tracing::debug!(from = %from, available, required = amount, "transfer refused");
            return Err(LedgerError::InsufficientFunds {
                available,
                required: amount,
            });
        }
        let credited = to_balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Validation("balance overflow".into()))?;

        let now = Utc::now();
        if let Some(source) = state.account_mut(from) {
            source.balance = available - amount;
            source
                .history
                .push(Transaction::debit(delta, description, to, now));
        }
        if let Some(dest) = state.account_mut(to) {
            dest.balance = credited;
            dest.history
                .push(Transaction::credit(delta, description, from, now));
        }
        self.save_state(&state).await?;

        tracing::info!(from = %from, to = %to, amount, description, "credits transferred");
        Ok(())
    }

    /// Spend credits for a paid action. The credits go back to the pool, so
    /// `total_supply` is unchanged. Callers perform the paid action only
    /// after this returns `Ok`.
    pub async fn consume(
        &self,
        did: &Did,
        amount: u64,
        description: &str,
    ) -> Result<(), LedgerError> {
        self.transfer(&Party::Identity(did.clone()), &Party::Pool, amount, description)
            .await
    }

    pub async fn balance(&self, party: &Party) -> Result<u64, LedgerError> {
        let state = self.load_state().await?;
        state
            .account(party)
            .map(|a| a.balance)
            .ok_or_else(|| LedgerError::NotFound(party.to_string()))
    }

    /// Chronological history of one party.
    pub async fn history(&self, party: &Party) -> Result<Vec<Transaction>, LedgerError> {
        let mut state = self.load_state().await?;
        match party {
            Party::Pool => Ok(std::mem::take(&mut state.pool.history)),
            Party::Identity(did) => state
                .accounts
                .remove(did.uri())
                .map(|a| a.history)
                .ok_or_else(|| LedgerError::NotFound(party.to_string())),
        }
    }

    /// Pool plus all account balances.
    pub async fn total_supply(&self) -> Result<u128, LedgerError> {
        Ok(self.load_state().await?.total_supply())
    }

    pub async fn is_bootstrapped(&self) -> Result<bool, LedgerError> {
        Ok(self.load_state().await?.bootstrapped)
    }
}

fn signed_amount(amount: u64) -> Result<i64, LedgerError> {
    if amount == 0 {
        return Err(LedgerError::Validation("amount must be positive".into()));
    }
    i64::try_from(amount)
        .map_err(|_| LedgerError::Validation(format!("amount {} too large", amount)))
}
