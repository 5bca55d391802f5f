use attesta_credentials::CredentialError;
use attesta_identity::IdentityError;
use attesta_ledger::LedgerError;

/// Errors surfaced by platform actions.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("refund of {amount} to {did} failed after '{cause}': {source}")]
    RefundFailed {
        did: String,
        amount: u64,
        cause: String,
        #[source]
        source: LedgerError,
    },
}

impl PlatformError {
    /// Whether the failure is a missing organization, member or account.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Identity(IdentityError::NotFound(_)) | Self::Ledger(LedgerError::NotFound(_))
        )
    }
}
