use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;

use crate::error::CryptoError;

/// ChaCha20-Poly1305 nonce length.
pub const NONCE_LEN: usize = 12;

/// Poly1305 tag length.
pub const TAG_LEN: usize = 16;

/// Sealed data: random nonce plus ciphertext with its authentication tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    /// 12-byte nonce for ChaCha20-Poly1305.
    pub nonce: [u8; NONCE_LEN],
    /// Encrypted data (ciphertext + 16-byte Poly1305 tag).
    pub ciphertext: Vec<u8>,
}

impl EncryptedPayload {
    /// Serialize to bytes: nonce (12) + ciphertext (variable).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(NONCE_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Deserialize from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::DecryptionError("payload too short".into()));
        }
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[..NONCE_LEN]);
        Ok(Self {
            nonce,
            ciphertext: bytes[NONCE_LEN..].to_vec(),
        })
    }
}

/// Encrypt `plaintext` under a 32-byte key. `aad` is authenticated but not
/// encrypted; the same bytes must be supplied to [`open`].
pub fn seal(plaintext: &[u8], key: &[u8; 32], aad: &[u8]) -> Result<EncryptedPayload, CryptoError> {
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let cipher = ChaCha20Poly1305::new_from_slice(key)
        .map_err(|e| CryptoError::EncryptionError(format!("cipher init failed: {}", e)))?;
    let ciphertext = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|e| CryptoError::EncryptionError(format!("encryption failed: {}", e)))?;

    Ok(EncryptedPayload {
        nonce: nonce_bytes,
        ciphertext,
    })
}

/// Decrypt and authenticate a payload. A wrong key, wrong `aad`, or any
/// modified byte fails with [`CryptoError::DecryptionError`].
pub fn open(payload: &EncryptedPayload, key: &[u8; 32], aad: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let nonce = Nonce::from_slice(&payload.nonce);
    let cipher = ChaCha20Poly1305::new_from_slice(key)
        .map_err(|e| CryptoError::DecryptionError(format!("cipher init failed: {}", e)))?;
    cipher
        .decrypt(
            nonce,
            Payload {
                msg: payload.ciphertext.as_slice(),
                aad,
            },
        )
        .map_err(|_| CryptoError::DecryptionError("authentication failed".into()))
}
