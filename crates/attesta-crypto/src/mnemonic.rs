use std::fmt;

use bip39::Mnemonic;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;
use crate::keys::KeyPair;

/// Number of words in every generated seed phrase.
pub const WORD_COUNT: usize = 12;

/// Entropy behind a [`WORD_COUNT`]-word phrase.
const ENTROPY_BYTES: usize = 16;

/// Domain separator for turning a BIP-39 seed into an identity key.
const IDENTITY_KEY_CONTEXT: &str = "attesta 2024 identity-key v1";

/// A BIP-39 English mnemonic phrase. Zeroized on drop; never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretSeed {
    phrase: String,
}

impl SecretSeed {
    /// Generate a fresh phrase from OS entropy.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut entropy = [0u8; ENTROPY_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut entropy);
        let result = Mnemonic::from_entropy(&entropy)
            .map_err(|e| CryptoError::InvalidMnemonic(e.to_string()));
        entropy.zeroize();
        Ok(Self {
            phrase: result?.to_string(),
        })
    }

    /// Parse a user-supplied phrase. Whitespace and case are normalized;
    /// word count, wordlist membership and checksum are validated.
    pub fn parse(phrase: &str) -> Result<Self, CryptoError> {
        let normalized = phrase
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        let mnemonic = Mnemonic::parse_normalized(&normalized)
            .map_err(|e| CryptoError::InvalidMnemonic(e.to_string()))?;
        if mnemonic.word_count() != WORD_COUNT {
            return Err(CryptoError::InvalidMnemonic(format!(
                "expected {} words, got {}",
                WORD_COUNT,
                mnemonic.word_count()
            )));
        }
        Ok(Self { phrase: normalized })
    }

    /// The phrase itself. Handle with care.
    pub fn expose(&self) -> &str {
        &self.phrase
    }

    /// Derive the identity key pair: BIP-39 seed (empty passphrase), then a
    /// BLAKE3 domain-separated 32-byte Ed25519 seed.
    pub fn identity_keypair(&self) -> Result<KeyPair, CryptoError> {
        let mnemonic = Mnemonic::parse_normalized(&self.phrase)
            .map_err(|e| CryptoError::InvalidMnemonic(e.to_string()))?;
        let mut seed = mnemonic.to_seed_normalized("");
        let mut key_seed = blake3::derive_key(IDENTITY_KEY_CONTEXT, &seed);
        let keypair = KeyPair::from_seed(&key_seed);
        seed.zeroize();
        key_seed.zeroize();
        Ok(keypair)
    }
}

impl fmt::Debug for SecretSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretSeed(<{} words redacted>)", WORD_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_generate_has_fixed_word_count() {
        let seed = SecretSeed::generate().unwrap();
        assert_eq!(seed.expose().split(' ').count(), WORD_COUNT);
        assert!(SecretSeed::parse(seed.expose()).is_ok());
    }

    #[test]
    fn test_generate_is_random() {
        let a = SecretSeed::generate().unwrap();
        let b = SecretSeed::generate().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_normalizes_whitespace_and_case() {
        let messy = format!("  {}  ", PHRASE.to_uppercase().replace(' ', "   "));
        let seed = SecretSeed::parse(&messy).unwrap();
        assert_eq!(seed.expose(), PHRASE);
    }

    #[test]
    fn test_parse_rejects_bad_checksum() {
        let bad = PHRASE.replace("about", "abandon");
        assert!(matches!(
            SecretSeed::parse(&bad),
            Err(CryptoError::InvalidMnemonic(_))
        ));
    }

    #[test]
    fn test_parse_rejects_wrong_word_count() {
        let long = "abandon abandon abandon abandon abandon abandon abandon abandon \
                    abandon abandon abandon abandon abandon abandon abandon abandon \
                    abandon abandon abandon abandon abandon abandon abandon art";
        assert!(SecretSeed::parse(long).is_err());
    }

    #[test]
    fn test_identity_keypair_deterministic() {
        let seed = SecretSeed::parse(PHRASE).unwrap();
        let a = seed.identity_keypair().unwrap();
        let b = seed.identity_keypair().unwrap();
        assert_eq!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_debug_redacts_phrase() {
        let seed = SecretSeed::parse(PHRASE).unwrap();
        let printed = format!("{:?}", seed);
        assert!(!printed.contains("abandon"));
    }
}
