use attesta_core::{Did, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::IdentityError;
use crate::manager::EncryptedSecretBlob;

/// How a member is labelled: people get a display name, machines a serial tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MemberLabel {
    DisplayName(String),
    SerialTag(String),
}

impl MemberLabel {
    /// The label text.
    pub fn as_str(&self) -> &str {
        match self {
            Self::DisplayName(s) | Self::SerialTag(s) => s,
        }
    }
}

impl fmt::Display for MemberLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for adding a member to an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub label: MemberLabel,
    pub role: Role,
}

impl NewMember {
    /// A member identified by a display name.
    pub fn named(name: impl Into<String>, role: Role) -> Self {
        Self {
            label: MemberLabel::DisplayName(name.into()),
            role,
        }
    }

    /// A machine identified by its serial tag.
    pub fn machine(serial_tag: impl Into<String>) -> Self {
        Self {
            label: MemberLabel::SerialTag(serial_tag.into()),
            role: Role::Machine,
        }
    }

    /// Reject input the directory would refuse to store.
    pub fn validate(&self) -> Result<(), IdentityError> {
        if self.label.as_str().trim().is_empty() {
            return Err(IdentityError::Validation("member label must not be empty".into()));
        }
        Ok(())
    }
}

/// A member of an organization, holding its own scoped identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub label: MemberLabel,
    pub role: Role,
    pub identity: Did,
    pub encrypted_secret: EncryptedSecretBlob,
    /// Ledger account key for this member.
    pub balance_ref: String,
    pub created_at: DateTime<Utc>,
}

/// An organization and its members. Member DIDs are unique within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub name: String,
    pub identity: Did,
    pub encrypted_secret: EncryptedSecretBlob,
    #[serde(default)]
    pub members: Vec<Member>,
    pub created_at: DateTime<Utc>,
}

impl Organization {
    /// Look up a member by DID.
    pub fn member(&self, did: &Did) -> Option<&Member> {
        self.members.iter().find(|m| &m.identity == did)
    }

    /// The organization's DID followed by every member DID.
    pub fn all_identities(&self) -> Vec<Did> {
        std::iter::once(self.identity.clone())
            .chain(self.members.iter().map(|m| m.identity.clone()))
            .collect()
    }
}

/// What a secret lookup matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Organization,
    Member,
}

/// Result of a secret lookup. For a member match, `organization` is the
/// parent organization.
#[derive(Debug, Clone)]
pub struct LookupMatch {
    pub kind: EntityKind,
    pub organization: Organization,
    pub member: Option<Member>,
}

impl LookupMatch {
    /// DID of the matched entity.
    pub fn did(&self) -> &Did {
        match &self.member {
            Some(member) => &member.identity,
            None => &self.organization.identity,
        }
    }
}
