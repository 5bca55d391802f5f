use argon2::{Algorithm, Argon2, Params, Version};
use attesta_core::KdfConfig;
use rand::RngCore;

use crate::error::CryptoError;

/// Salt length for password-derived keys.
pub const SALT_LEN: usize = 16;

/// Domain separator for the legacy application-wide key.
const APP_KEY_CONTEXT: &str = "attesta 2024 legacy app-key sealing v1";

/// Fresh random salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive a 32-byte key from a password using Argon2id.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    params: &KdfConfig,
) -> Result<[u8; 32], CryptoError> {
    let argon_params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(32),
    )
    .map_err(|e| CryptoError::KeyDerivationError(format!("invalid argon2 params: {}", e)))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);
    tracing::trace!(
        memory_kib = params.memory_kib,
        iterations = params.iterations,
        "deriving argon2id key"
    );

    let mut out = [0u8; 32];
    argon2
        .hash_password_into(password, salt, &mut out)
        .map_err(|e| CryptoError::KeyDerivationError(format!("argon2 hash failed: {}", e)))?;
    Ok(out)
}

/// Derive a 32-byte key from a high-entropy application secret.
pub fn derive_key_from_app_secret(secret: &[u8]) -> [u8; 32] {
    blake3::derive_key(APP_KEY_CONTEXT, secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> KdfConfig {
        KdfConfig::insecure_fast()
    }

    #[test]
    fn test_derive_key_deterministic_for_salt() {
        let salt = [3u8; SALT_LEN];
        let k1 = derive_key(b"test-password-123", &salt, &fast()).unwrap();
        let k2 = derive_key(b"test-password-123", &salt, &fast()).unwrap();
        assert_eq!(k1, k2);
    }

    #[test]
    fn test_different_passwords_different_keys() {
        let salt = generate_salt();
        let k1 = derive_key(b"password1", &salt, &fast()).unwrap();
        let k2 = derive_key(b"password2", &salt, &fast()).unwrap();
        assert_ne!(k1, k2);
    }

    #[test]
    fn test_different_salts_different_keys() {
        let k1 = derive_key(b"password", &[1u8; SALT_LEN], &fast()).unwrap();
        let k2 = derive_key(b"password", &[2u8; SALT_LEN], &fast()).unwrap();
        assert_ne!(k1, k2);
    }

    #[test]
    fn test_derive_key_empty_password() {
        assert!(derive_key(b"", &generate_salt(), &fast()).is_ok());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = KdfConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        };
        assert!(matches!(
            derive_key(b"pw", &generate_salt(), &params),
            Err(CryptoError::KeyDerivationError(_))
        ));
    }

    #[test]
    fn test_app_secret_key_deterministic() {
        assert_eq!(
            derive_key_from_app_secret(b"app"),
            derive_key_from_app_secret(b"app")
        );
        assert_ne!(
            derive_key_from_app_secret(b"app"),
            derive_key_from_app_secret(b"other")
        );
    }
}
