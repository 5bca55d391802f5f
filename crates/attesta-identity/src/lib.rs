//! Attesta Identity Layer
//!
//! - Seed phrase generation and deterministic DID derivation
//! - Authenticated at-rest sealing of seed phrases (app key or password)
//! - The entity directory: organizations, their members, and secret lookup

pub mod directory;
pub mod entity;
pub mod error;
pub mod manager;

pub use directory::EntityDirectory;
pub use entity::{EntityKind, LookupMatch, Member, MemberLabel, NewMember, Organization};
pub use error::IdentityError;
pub use manager::{EncryptedSecretBlob, Identity, IdentityManager, MintedIdentity, Scheme, SecretKey};
