use std::fmt;

use attesta_core::Did;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CredentialError;

/// Proof type tag for a SHA-256 digest over the canonical document.
pub const PROOF_TYPE: &str = "CanonicalSha256Digest";

/// Default JSON-LD context.
pub const CREDENTIALS_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

/// Base type carried by every credential.
pub const BASE_TYPE: &str = "VerifiableCredential";

/// Known credential kinds, with an open fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialKind {
    /// Digital product passport for a manufactured item.
    ProductPassport,
    /// Proof of membership in an organization.
    MembershipCredential,
    /// Any other type name.
    Custom(String),
}

impl CredentialKind {
    /// The `type` entry for this kind.
    pub fn type_name(&self) -> &str {
        match self {
            Self::ProductPassport => "ProductPassport",
            Self::MembershipCredential => "MembershipCredential",
            Self::Custom(name) => name,
        }
    }

    /// Classify a `type` array. The first entry other than the base type
    /// decides; a bare base type is `Custom("VerifiableCredential")`.
    pub fn from_types(types: &[String]) -> Self {
        let specific = types
            .iter()
            .find(|t| t.as_str() != BASE_TYPE)
            .map(String::as_str)
            .unwrap_or(BASE_TYPE);
        match specific {
            "ProductPassport" => Self::ProductPassport,
            "MembershipCredential" => Self::MembershipCredential,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// The subject of a credential: an optional id plus open claims.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialSubject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

impl CredentialSubject {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            claims: Map::new(),
        }
    }

    /// Builder-style claim insertion.
    pub fn with_claim(mut self, key: impl Into<String>, value: Value) -> Self {
        self.claims.insert(key.into(), value);
        self
    }
}

/// Integrity proof envelope. The digest is read from `digest`, falling back
/// to `jws` for documents produced by older tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    #[serde(rename = "type")]
    pub proof_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jws: Option<String>,
    pub verification_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

impl Proof {
    /// A digest proof stamped now.
    pub fn digest(digest: String, verification_method: &Did) -> Self {
        Self {
            proof_type: PROOF_TYPE.to_string(),
            digest: Some(digest),
            jws: None,
            verification_method: verification_method.to_string(),
            created: Some(now_iso()),
        }
    }

    /// The carried digest, from `digest` or else `jws`.
    pub fn carried_digest(&self) -> Option<&str> {
        self.digest.as_deref().or(self.jws.as_deref())
    }
}

/// A credential document.
///
/// Fields outside the fixed shape land in `extensions` and are covered by
/// the proof unless they are excluded by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDocument {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub issuer: String,
    pub issuance_date: String,
    pub credential_subject: CredentialSubject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_history: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl CredentialDocument {
    /// A draft credential of `kind` issued now, with a fresh `urn:uuid` id.
    pub fn new(kind: CredentialKind, issuer: &Did, subject: CredentialSubject) -> Self {
        let mut types = vec![BASE_TYPE.to_string()];
        if kind.type_name() != BASE_TYPE {
            types.push(kind.type_name().to_string());
        }
        let mut extensions = Map::new();
        extensions.insert(
            "id".into(),
            Value::String(format!("urn:uuid:{}", uuid::Uuid::now_v7())),
        );

        Self {
            context: vec![CREDENTIALS_CONTEXT.to_string()],
            types,
            issuer: issuer.to_string(),
            issuance_date: now_iso(),
            credential_subject: subject,
            event_history: None,
            proof: None,
            extensions,
        }
    }

    /// Set an extension field.
    pub fn with_extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    pub fn kind(&self) -> CredentialKind {
        CredentialKind::from_types(&self.types)
    }

    /// Check fields that must be well formed before issuance.
    pub fn validate(&self) -> Result<(), CredentialError> {
        if self.types.is_empty() {
            return Err(CredentialError::Validation("type must not be empty".into()));
        }
        if self.issuer.trim().is_empty() {
            return Err(CredentialError::Validation("issuer must not be empty".into()));
        }
        DateTime::parse_from_rfc3339(&self.issuance_date).map_err(|e| {
            CredentialError::Validation(format!(
                "issuanceDate {:?} is not ISO-8601: {}",
                self.issuance_date, e
            ))
        })?;
        Ok(())
    }

    pub fn to_value(&self) -> Result<Value, CredentialError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_value(value: Value) -> Result<Self, CredentialError> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Append an entry to the document's event history. The proof does not cover
/// the history, so an issued document stays valid.
pub fn append_event(doc: &mut CredentialDocument, event: Value) {
    doc.event_history.get_or_insert_with(Vec::new).push(event);
}

pub(crate) fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
