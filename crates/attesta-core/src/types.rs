use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Prefix shared by every identity minted on the platform.
pub const DID_PREFIX: &str = "did:iota:evm:";

/// A 20-byte account address derived from an identity key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Lowercase hex without a `0x` prefix (40 chars).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse 40 hex characters, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        if raw.len() != 40 {
            return Err(CoreError::InvalidAddress(format!(
                "expected 40 hex characters, got {}",
                raw.len()
            )));
        }
        let bytes = hex::decode(raw).map_err(|e| CoreError::InvalidAddress(e.to_string()))?;
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

/// Decentralized Identifier used as the system-wide identity key.
/// Format: `did:iota:evm:<40 lowercase hex characters>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    /// Parse and validate a DID URI.
    pub fn new(uri: impl Into<String>) -> Result<Self, CoreError> {
        let uri = uri.into();
        let Some(addr) = uri.strip_prefix(DID_PREFIX) else {
            return Err(CoreError::InvalidDid(format!(
                "DID must start with '{}', got: {}",
                DID_PREFIX, uri
            )));
        };
        let well_formed = addr.len() == 40
            && addr
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
        if !well_formed {
            return Err(CoreError::InvalidDid(format!(
                "DID must end in 40 lowercase hex characters, got: {}",
                uri
            )));
        }
        Ok(Self(uri))
    }

    /// Build the DID for an address.
    pub fn from_address(address: &Address) -> Self {
        Self(format!("{}{}", DID_PREFIX, address.to_hex()))
    }

    /// Get the full DID URI.
    pub fn uri(&self) -> &str {
        &self.0
    }

    /// Recover the address embedded in the DID.
    pub fn address(&self) -> Address {
        // Constructors guarantee 40 lowercase hex characters after the prefix.
        Address::from_hex(&self.0[DID_PREFIX.len()..]).unwrap_or(Address([0u8; 20]))
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Did {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Did {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}

/// Role a member plays inside an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// A human operating on behalf of the organization.
    Operator,
    /// A device identified by a serial tag.
    Machine,
    /// A member allowed to author credentials.
    Creator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operator => write!(f, "Operator"),
            Self::Machine => write!(f, "Machine"),
            Self::Creator => write!(f, "Creator"),
        }
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "operator" => Ok(Self::Operator),
            "machine" => Ok(Self::Machine),
            "creator" => Ok(Self::Creator),
            other => Err(CoreError::UnknownRole(other.to_string())),
        }
    }
}
