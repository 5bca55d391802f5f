//! Shared fixtures for the cross-crate tests.

use std::sync::Arc;

use attesta_core::{KdfConfig, MemoryStore, PlatformConfig};
use attesta_identity::SecretKey;
use attesta_platform::Platform;

/// A platform over a fresh in-memory store with cheap password hashing.
pub fn platform(config: PlatformConfig) -> (Platform, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let config = PlatformConfig {
        kdf: KdfConfig::insecure_fast(),
        ..config
    };
    (Platform::new(store.clone(), config), store)
}

pub fn app_key() -> SecretKey {
    SecretKey::AppKey("integration-app-key".into())
}

pub fn password(pw: &str) -> SecretKey {
    SecretKey::Password(pw.to_string())
}
