//! Identity Manager: seed generation, DID derivation, and sealing seeds at rest.
//!
//! Sealed blobs are self-describing strings:
//!
//! ```text
//! app1$<base64 nonce||ciphertext>
//! pw1$m=<kib>,t=<iter>,p=<par>$<base64 salt>$<base64 nonce||ciphertext>
//! ```
//!
//! Everything before the final `$` is bound to the ciphertext as associated
//! data, so neither the scheme tag nor the KDF parameters can be swapped.

use std::fmt;

use attesta_core::{Address, Did, KdfConfig};
use attesta_crypto::{
    derive_key, derive_key_from_app_secret, generate_salt, open, seal, CryptoError,
    EncryptedPayload, SecretSeed,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::IdentityError;

const APP_TAG: &str = "app1";
const PASSWORD_TAG: &str = "pw1";

/// Key material used to seal a seed phrase. Zeroized on drop.
#[derive(Clone)]
pub enum SecretKey {
    /// Legacy application-wide key shared by every record.
    AppKey(String),
    /// Per-user password (preferred).
    Password(String),
}

impl SecretKey {
    fn scheme(&self) -> Scheme {
        match self {
            Self::AppKey(_) => Scheme::AppKey,
            Self::Password(_) => Scheme::Password,
        }
    }

    fn material(&self) -> &str {
        match self {
            Self::AppKey(k) | Self::Password(k) => k,
        }
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        match self {
            Self::AppKey(k) | Self::Password(k) => k.zeroize(),
        }
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AppKey(_) => write!(f, "SecretKey::AppKey(<redacted>)"),
            Self::Password(_) => write!(f, "SecretKey::Password(<redacted>)"),
        }
    }
}

/// Sealing scheme recorded in a blob's tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// BLAKE3-derived app key + ChaCha20-Poly1305.
    AppKey,
    /// Argon2id password key + ChaCha20-Poly1305.
    Password,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AppKey => write!(f, "{}", APP_TAG),
            Self::Password => write!(f, "{}", PASSWORD_TAG),
        }
    }
}

/// The only persisted form of a seed phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedSecretBlob(String);

impl EncryptedSecretBlob {
    /// Wrap a stored blob string. Validity is checked on decryption.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The blob as stored.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Scheme named by the tag prefix, if recognised.
    pub fn scheme(&self) -> Option<Scheme> {
        match self.0.split('$').next() {
            Some(APP_TAG) => Some(Scheme::AppKey),
            Some(PASSWORD_TAG) => Some(Scheme::Password),
            _ => None,
        }
    }
}

impl fmt::Display for EncryptedSecretBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A derived identity: account address plus its DID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub address: Address,
    pub did: Did,
}

/// A freshly minted identity. `seed` must be shown to its owner once and
/// then dropped; only `blob` is persisted.
#[derive(Debug)]
pub struct MintedIdentity {
    pub identity: Identity,
    pub seed: SecretSeed,
    pub blob: EncryptedSecretBlob,
}

/// Generates seeds, derives identities, and seals seeds at rest.
#[derive(Debug, Clone, Default)]
pub struct IdentityManager {
    kdf: KdfConfig,
}

impl IdentityManager {
    /// Create a manager that seals password blobs with the given Argon2id cost.
    pub fn new(kdf: KdfConfig) -> Self {
        Self { kdf }
    }

    /// Generate a fresh seed phrase from OS entropy.
    pub fn generate_secret(&self) -> Result<SecretSeed, IdentityError> {
        Ok(SecretSeed::generate()?)
    }

    /// Derive the address and DID for a seed. Pure: the same seed always
    /// yields the same identity.
    pub fn derive_identity(&self, seed: &SecretSeed) -> Result<Identity, IdentityError> {
        let keypair = seed.identity_keypair()?;
        let address = keypair.address();
        Ok(Identity {
            address,
            did: Did::from_address(&address),
        })
    }

    /// Generate, derive, and seal in one step.
    pub fn mint(&self, key: &SecretKey) -> Result<MintedIdentity, IdentityError> {
        let seed = self.generate_secret()?;
        let identity = self.derive_identity(&seed)?;
        let blob = self.encrypt_secret(&seed, key)?;
        tracing::debug!(did = %identity.did, scheme = %key.scheme(), "identity minted");
        Ok(MintedIdentity {
            identity,
            seed,
            blob,
        })
    }

    /// Seal a seed phrase under `key`.
    pub fn encrypt_secret(
        &self,
        seed: &SecretSeed,
        key: &SecretKey,
    ) -> Result<EncryptedSecretBlob, IdentityError> {
        if key.material().is_empty() {
            return Err(IdentityError::Validation("sealing key must not be empty".into()));
        }
        let plaintext = seed.expose().as_bytes();

        match key {
            SecretKey::AppKey(app_key) => {
                let mut sym = derive_key_from_app_secret(app_key.as_bytes());
                let sealed = seal(plaintext, &sym, APP_TAG.as_bytes());
                sym.zeroize();
                Ok(EncryptedSecretBlob(format!(
                    "{}${}",
                    APP_TAG,
                    STANDARD.encode(sealed?.to_bytes())
                )))
            }
            SecretKey::Password(password) => {
                let salt = generate_salt();
                let header = format!(
                    "{}$m={},t={},p={}${}",
                    PASSWORD_TAG,
                    self.kdf.memory_kib,
                    self.kdf.iterations,
                    self.kdf.parallelism,
                    STANDARD.encode(salt)
                );
                let mut sym = derive_key(password.as_bytes(), &salt, &self.kdf)?;
                let sealed = seal(plaintext, &sym, header.as_bytes());
                sym.zeroize();
                Ok(EncryptedSecretBlob(format!(
                    "{}${}",
                    header,
                    STANDARD.encode(sealed?.to_bytes())
                )))
            }
        }
    }

    /// Open a sealed seed phrase. Any wrong key, scheme mismatch, malformed
    /// field or modified byte fails with [`IdentityError::Decryption`].
    pub fn decrypt_secret(
        &self,
        blob: &EncryptedSecretBlob,
        key: &SecretKey,
    ) -> Result<SecretSeed, IdentityError> {
        let scheme = blob
            .scheme()
            .ok_or_else(|| IdentityError::Decryption("unrecognised scheme tag".into()))?;
        if scheme != key.scheme() {
            return Err(IdentityError::Decryption(format!(
                "blob sealed with {} scheme, key is for {}",
                scheme,
                key.scheme()
            )));
        }

        let (header, body) = blob
            .0
            .rsplit_once('$')
            .ok_or_else(|| IdentityError::Decryption("malformed blob".into()))?;
        let payload = STANDARD
            .decode(body)
            .map_err(|e| IdentityError::Decryption(format!("malformed ciphertext: {}", e)))
            .and_then(|bytes| EncryptedPayload::from_bytes(&bytes).map_err(decryption))?;

        let mut sym = match key {
            SecretKey::AppKey(app_key) => {
                if header != APP_TAG {
                    return Err(IdentityError::Decryption("malformed app-key header".into()));
                }
                derive_key_from_app_secret(app_key.as_bytes())
            }
            SecretKey::Password(password) => {
                let (params, salt) = parse_password_header(header)?;
                if !self.within_cost_cap(&params) {
                    return Err(IdentityError::Decryption(format!(
                        "kdf parameters m={},t={},p={} exceed the allowed cost",
                        params.memory_kib, params.iterations, params.parallelism
                    )));
                }
                derive_key(password.as_bytes(), &salt, &params).map_err(decryption)?
            }
        };
        let opened = open(&payload, &sym, header.as_bytes());
        sym.zeroize();
        let mut plaintext = opened.map_err(decryption)?;

        let phrase = std::str::from_utf8(&plaintext)
            .map_err(|_| IdentityError::Decryption("plaintext is not UTF-8".into()))
            .and_then(|s| SecretSeed::parse(s).map_err(decryption));
        plaintext.zeroize();
        phrase
    }

    /// Headers are read before the AEAD check, so their cost is bounded by
    /// the configured KDF or the default one, whichever is higher.
    fn within_cost_cap(&self, params: &KdfConfig) -> bool {
        let default = KdfConfig::default();
        params.memory_kib <= self.kdf.memory_kib.max(default.memory_kib)
            && params.iterations <= self.kdf.iterations.max(default.iterations)
            && params.parallelism <= self.kdf.parallelism.max(default.parallelism)
    }

    /// Re-seal a blob under a new key, e.g. to migrate off the legacy app key.
    pub fn rewrap_secret(
        &self,
        blob: &EncryptedSecretBlob,
        old_key: &SecretKey,
        new_key: &SecretKey,
    ) -> Result<EncryptedSecretBlob, IdentityError> {
        let seed = self.decrypt_secret(blob, old_key)?;
        self.encrypt_secret(&seed, new_key)
    }
}

fn decryption(e: CryptoError) -> IdentityError {
    IdentityError::Decryption(e.to_string())
}

/// Parse `pw1$m=..,t=..,p=..$<salt>`.
fn parse_password_header(header: &str) -> Result<(KdfConfig, Vec<u8>), IdentityError> {
    let malformed = || IdentityError::Decryption("malformed password header".into());

    let mut parts = header.split('$');
    let (Some(PASSWORD_TAG), Some(params), Some(salt), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed());
    };

    let mut kdf = KdfConfig::default();
    let mut seen = 0;
    for pair in params.split(',') {
        let (name, value) = pair.split_once('=').ok_or_else(malformed)?;
        let value: u32 = value.parse().map_err(|_| malformed())?;
        match name {
            "m" => kdf.memory_kib = value,
            "t" => kdf.iterations = value,
            "p" => kdf.parallelism = value,
            _ => return Err(malformed()),
        }
        seen += 1;
    }
    if seen != 3 {
        return Err(malformed());
    }

    let salt = STANDARD.decode(salt).map_err(|_| malformed())?;
    Ok((kdf, salt))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn manager() -> IdentityManager {
        IdentityManager::new(KdfConfig::insecure_fast())
    }

    fn app_key() -> SecretKey {
        SecretKey::AppKey("platform-wide-key".into())
    }

    fn password() -> SecretKey {
        SecretKey::Password("correct horse battery staple".into())
    }

    #[test]
    fn test_derive_identity_deterministic() {
        let mgr = manager();
        let seed = SecretSeed::parse(PHRASE).unwrap();
        let a = mgr.derive_identity(&seed).unwrap();
        let b = mgr.derive_identity(&seed).unwrap();
        assert_eq!(a, b);
        assert!(a.did.uri().starts_with("did:iota:evm:"));
        assert_eq!(a.did.uri().len(), "did:iota:evm:".len() + 40);
        assert_eq!(a.did.address(), a.address);
    }

    #[test]
    fn test_distinct_seeds_distinct_identities() {
        let mgr = manager();
        let a = mgr.mint(&app_key()).unwrap();
        let b = mgr.mint(&app_key()).unwrap();
        assert_ne!(a.identity.did, b.identity.did);
    }

    #[test]
    fn test_app_key_roundtrip() {
        let mgr = manager();
        let seed = mgr.generate_secret().unwrap();
        let blob = mgr.encrypt_secret(&seed, &app_key()).unwrap();
        assert!(blob.as_str().starts_with("app1$"));
        assert_eq!(blob.scheme(), Some(Scheme::AppKey));
        assert_eq!(mgr.decrypt_secret(&blob, &app_key()).unwrap(), seed);
    }

    #[test]
    fn test_password_roundtrip() {
        let mgr = manager();
        let seed = mgr.generate_secret().unwrap();
        let blob = mgr.encrypt_secret(&seed, &password()).unwrap();
        assert!(blob.as_str().starts_with("pw1$m=8,t=1,p=1$"));
        assert_eq!(mgr.decrypt_secret(&blob, &password()).unwrap(), seed);
    }

    #[test]
    fn test_plaintext_never_in_blob() {
        let mgr = manager();
        let seed = SecretSeed::parse(PHRASE).unwrap();
        let blob = mgr.encrypt_secret(&seed, &app_key()).unwrap();
        assert!(!blob.as_str().contains("abandon"));
    }

    #[test]
    fn test_wrong_app_key_detected() {
        let mgr = manager();
        let seed = mgr.generate_secret().unwrap();
        let blob = mgr.encrypt_secret(&seed, &app_key()).unwrap();
        let result = mgr.decrypt_secret(&blob, &SecretKey::AppKey("other".into()));
        assert!(matches!(result, Err(IdentityError::Decryption(_))));
    }

    #[test]
    fn test_wrong_password_detected() {
        let mgr = manager();
        let seed = mgr.generate_secret().unwrap();
        let blob = mgr.encrypt_secret(&seed, &password()).unwrap();
        let result = mgr.decrypt_secret(&blob, &SecretKey::Password("wrong".into()));
        assert!(matches!(result, Err(IdentityError::Decryption(_))));
    }

    #[test]
    fn test_scheme_mismatch_detected() {
        let mgr = manager();
        let seed = mgr.generate_secret().unwrap();
        let blob = mgr.encrypt_secret(&seed, &app_key()).unwrap();
        let result = mgr.decrypt_secret(&blob, &SecretKey::Password("platform-wide-key".into()));
        assert!(matches!(result, Err(IdentityError::Decryption(_))));
    }

    #[test]
    fn test_tampered_params_detected() {
        let mgr = manager();
        let seed = mgr.generate_secret().unwrap();
        let blob = mgr.encrypt_secret(&seed, &password()).unwrap();
        let forged = EncryptedSecretBlob::from_string(blob.as_str().replacen("t=1", "t=2", 1));
        assert!(matches!(
            mgr.decrypt_secret(&forged, &password()),
            Err(IdentityError::Decryption(_))
        ));
    }

    #[test]
    fn test_costly_header_rejected_before_kdf() {
        let mgr = manager();
        let seed = mgr.generate_secret().unwrap();
        let blob = mgr.encrypt_secret(&seed, &password()).unwrap();
        let forged = EncryptedSecretBlob::from_string(
            blob.as_str().replacen("m=8,t=1", "m=65536,t=60", 1),
        );

        let started = std::time::Instant::now();
        let result = mgr.decrypt_secret(&forged, &password());
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
        match result {
            Err(IdentityError::Decryption(reason)) => assert!(reason.contains("allowed cost")),
            other => panic!("expected Decryption, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_default_cost_blob_opens_under_cheaper_config() {
        let strong = IdentityManager::new(KdfConfig::default());
        let seed = strong.generate_secret().unwrap();
        let blob = strong.encrypt_secret(&seed, &password()).unwrap();
        assert_eq!(manager().decrypt_secret(&blob, &password()).unwrap(), seed);
    }

    #[test]
    fn test_malformed_blobs_rejected() {
        let mgr = manager();
        for raw in ["", "plain-text", "app1$", "app1$!!!", "pw1$m=8$abc$def", "xyz$AAAA"] {
            let blob = EncryptedSecretBlob::from_string(raw);
            let key = if raw.starts_with("pw1") {
                password()
            } else {
                app_key()
            };
            assert!(
                matches!(mgr.decrypt_secret(&blob, &key), Err(IdentityError::Decryption(_))),
                "blob {:?} should fail",
                raw
            );
        }
    }

    #[test]
    fn test_empty_key_rejected() {
        let mgr = manager();
        let seed = mgr.generate_secret().unwrap();
        let result = mgr.encrypt_secret(&seed, &SecretKey::Password(String::new()));
        assert!(matches!(result, Err(IdentityError::Validation(_))));
    }

    #[test]
    fn test_rewrap_to_password() {
        let mgr = manager();
        let minted = mgr.mint(&app_key()).unwrap();
        let rewrapped = mgr
            .rewrap_secret(&minted.blob, &app_key(), &password())
            .unwrap();
        assert_eq!(rewrapped.scheme(), Some(Scheme::Password));
        let seed = mgr.decrypt_secret(&rewrapped, &password()).unwrap();
        assert_eq!(
            mgr.derive_identity(&seed).unwrap().did,
            minted.identity.did
        );
    }

    #[test]
    fn test_secret_key_debug_redacted() {
        let printed = format!("{:?}", password());
        assert!(!printed.contains("staple"));
    }
}
