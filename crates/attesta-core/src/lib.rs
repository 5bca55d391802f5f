//! Attesta Core: Shared types, errors, the store collaborator, and
//! configuration for the Attesta credential platform.

pub mod config;
pub mod credential_state;
pub mod error;
pub mod store;
pub mod types;

pub use config::{KdfConfig, PlatformConfig};
pub use credential_state::{CredentialEvent, CredentialState, CredentialStateMachine};
pub use error::{CoreError, StoreError};
pub use store::{MemoryStore, Store};
pub use types::{Address, Did, Role};
