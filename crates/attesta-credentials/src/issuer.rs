use attesta_core::Did;
use serde_json::Value;

use crate::canonical::document_digest;
use crate::document::{CredentialDocument, Proof};
use crate::error::CredentialError;

/// Stamp a typed document with a digest proof. Any existing proof is
/// replaced; the input is left untouched.
pub fn issue(doc: &CredentialDocument, issuer: &Did) -> Result<CredentialDocument, CredentialError> {
    doc.validate()?;
    let digest = document_digest(&doc.to_value()?);

    let mut issued = doc.clone();
    issued.proof = Some(Proof::digest(digest, issuer));

    tracing::info!(
        issuer = %issuer,
        kind = %issued.kind(),
        "credential issued"
    );
    Ok(issued)
}

/// Stamp a raw JSON document with a digest proof.
pub fn issue_value(doc: &Value, issuer: &Did) -> Result<Value, CredentialError> {
    let Value::Object(map) = doc else {
        return Err(CredentialError::Validation(
            "credential document must be a JSON object".into(),
        ));
    };

    let digest = document_digest(doc);
    let mut issued = map.clone();
    issued.insert(
        "proof".into(),
        serde_json::to_value(Proof::digest(digest, issuer))?,
    );

    tracing::info!(issuer = %issuer, "raw credential issued");
    Ok(Value::Object(issued))
}
