use attesta_core::CredentialState;
use serde_json::Value;

use crate::canonical::document_digest;
use crate::document::{CredentialDocument, Proof, PROOF_TYPE};

/// Result of credential verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    /// Whether the credential is intact.
    pub valid: bool,
    /// Why verification failed; `None` when valid.
    pub reason: Option<String>,
    /// Individual check results, in evaluation order.
    pub checks: Vec<VerificationCheck>,
}

/// An individual verification check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCheck {
    pub name: String,
    pub passed: bool,
    pub detail: Option<String>,
}

impl VerificationResult {
    fn push(&mut self, name: &str, passed: bool, failure: impl FnOnce() -> String) -> bool {
        let detail = if passed { None } else { Some(failure()) };
        if let Some(reason) = &detail {
            self.valid = false;
            self.reason.get_or_insert_with(|| reason.clone());
        }
        self.checks.push(VerificationCheck {
            name: name.into(),
            passed,
            detail,
        });
        passed
    }

    fn new() -> Self {
        Self {
            valid: true,
            reason: None,
            checks: Vec::new(),
        }
    }
}

/// Verify a typed document.
pub fn verify(doc: &CredentialDocument) -> VerificationResult {
    match doc.to_value() {
        Ok(value) => verify_value(&value),
        Err(e) => {
            let mut result = VerificationResult::new();
            result.push("serializable", false, || e.to_string());
            result
        }
    }
}

/// Recompute the digest of `doc` and compare it with the one in its proof.
/// A missing or malformed proof yields `valid == false`; this never errors.
pub fn verify_value(doc: &Value) -> VerificationResult {
    let mut result = VerificationResult::new();

    if !result.push("is_object", doc.is_object(), || {
        "document is not a JSON object".into()
    }) {
        return result;
    }

    let raw_proof = doc.get("proof");
    if !result.push("proof_present", raw_proof.is_some(), || {
        "document has no proof".into()
    }) {
        return result;
    }

    let proof = raw_proof.and_then(|p| serde_json::from_value::<Proof>(p.clone()).ok());
    let carried = proof
        .as_ref()
        .filter(|p| p.proof_type == PROOF_TYPE)
        .and_then(|p| p.carried_digest())
        .map(str::to_ascii_lowercase);
    if !result.push("proof_well_formed", carried.is_some(), || match &proof {
        None => "proof envelope is malformed".into(),
        Some(p) if p.proof_type != PROOF_TYPE => {
            format!("unsupported proof type {:?}", p.proof_type)
        }
        Some(_) => "proof carries no digest".into(),
    }) {
        return result;
    }

    let recomputed = document_digest(doc);
    let matches = carried.as_deref() == Some(recomputed.as_str());
    result.push("digest_matches", matches, || {
        "document content does not match its proof".into()
    });

    tracing::debug!(valid = result.valid, "credential verified");
    result
}

/// Integrity state of a raw document: `Draft` without a proof, otherwise
/// `Issued` or `Tampered` depending on verification.
pub fn classify(doc: &Value) -> CredentialState {
    if doc.get("proof").is_none() {
        return CredentialState::Draft;
    }
    if verify_value(doc).valid {
        CredentialState::Issued
    } else {
        CredentialState::Tampered
    }
}
