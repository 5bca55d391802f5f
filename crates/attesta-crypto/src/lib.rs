pub mod encryption;
pub mod error;
pub mod hashing;
pub mod kdf;
pub mod keys;
pub mod mnemonic;

pub use encryption::{open, seal, EncryptedPayload};
pub use error::CryptoError;
pub use hashing::{sha256, sha256_hex};
pub use kdf::{derive_key, derive_key_from_app_secret, generate_salt};
pub use keys::{KeyPair, PublicKey};
pub use mnemonic::SecretSeed;
