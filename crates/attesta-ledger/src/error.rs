use attesta_core::StoreError;

/// Ledger errors.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("account not found: {0}")]
    NotFound(String),

    #[error("insufficient funds: available {available}, required {required}")]
    InsufficientFunds { available: u64, required: u64 },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
