/// Credential engine errors.
///
/// A credential that fails verification is not an error; see
/// [`crate::VerificationResult`].
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
