use attesta_core::Address;
use ed25519_dalek::{SigningKey, VerifyingKey};

use crate::hashing::sha256;

/// Ed25519 identity key pair. The signing key zeroizes itself on drop.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Create a key pair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    /// Account address for this key pair.
    pub fn address(&self) -> Address {
        self.public_key().address()
    }
}

/// Ed25519 public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    verifying_key: VerifyingKey,
}

impl PublicKey {
    /// Get the raw bytes (32 bytes).
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.verifying_key.as_bytes()
    }

    /// Last 20 bytes of SHA-256 over the public key.
    pub fn address(&self) -> Address {
        let digest = sha256(self.as_bytes());
        let mut out = [0u8; 20];
        out.copy_from_slice(&digest[12..]);
        Address(out)
    }
}
