//! Attesta Credentials: tamper-evident credential documents.
//!
//! Documents are canonicalized (sorted keys, excluded fields stripped),
//! hashed with SHA-256, and stamped with a proof carrying the digest.

pub mod canonical;
pub mod document;
pub mod error;
pub mod issuer;
pub mod verifier;

pub use canonical::{canonicalize, compute_digest, strip_excluded, EXCLUDED_FIELDS};
pub use document::{
    append_event, CredentialDocument, CredentialKind, CredentialSubject, Proof, PROOF_TYPE,
};
pub use error::CredentialError;
pub use issuer::{issue, issue_value};
pub use verifier::{classify, verify, verify_value, VerificationCheck, VerificationResult};
