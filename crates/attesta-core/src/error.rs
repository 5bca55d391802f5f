use crate::credential_state::CredentialState;

/// Core protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: CredentialState,
        to: CredentialState,
    },

    #[error("invalid DID format: {0}")]
    InvalidDid(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// Errors raised by a [`Store`](crate::store::Store) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("corrupt aggregate under key '{key}': {reason}")]
    Corrupt { key: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
