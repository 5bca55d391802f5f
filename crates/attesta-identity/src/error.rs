use attesta_core::{CoreError, StoreError};
use attesta_crypto::CryptoError;

/// Identity-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
