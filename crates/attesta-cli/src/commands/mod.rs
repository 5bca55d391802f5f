pub mod credential;
pub mod init;
pub mod ledger;
pub mod lookup;
pub mod member;
pub mod org;

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context as _;
use attesta_core::Did;
use attesta_identity::SecretKey;
use attesta_ledger::Party;
use attesta_platform::Platform;

use crate::config::AttestaConfig;
use crate::storage::RocksStore;

/// Everything a command needs: the platform over the on-disk store and the
/// caller's sealing password, if given.
pub struct Context {
    pub platform: Platform,
    password: Option<String>,
}

impl Context {
    pub fn open(config: AttestaConfig, password: Option<String>) -> anyhow::Result<Self> {
        let store = RocksStore::open(&config.storage.data_dir).with_context(|| {
            format!("opening store at {}", config.storage.data_dir.display())
        })?;
        Ok(Self {
            platform: Platform::new(Arc::new(store), config.platform),
            password,
        })
    }

    /// The key to seal or open seed phrases with.
    pub fn sealing_key(&self) -> anyhow::Result<SecretKey> {
        Ok(self.platform.sealing_key(self.password.clone())?)
    }
}

pub fn parse_did(s: &str) -> anyhow::Result<Did> {
    Did::from_str(s).map_err(|e| anyhow::anyhow!("invalid DID {:?}: {}", s, e))
}

/// `pool` or a DID.
pub fn parse_party(s: &str) -> anyhow::Result<Party> {
    if s.eq_ignore_ascii_case("pool") {
        Ok(Party::Pool)
    } else {
        Ok(Party::Identity(parse_did(s)?))
    }
}

/// Read JSON from a file path, or treat the argument as inline JSON.
pub fn read_json(arg: &str) -> anyhow::Result<serde_json::Value> {
    let text = if std::path::Path::new(arg).exists() {
        std::fs::read_to_string(arg)?
    } else {
        arg.to_string()
    };
    serde_json::from_str(&text).map_err(|e| anyhow::anyhow!("invalid JSON: {}", e))
}

/// Print a freshly minted seed phrase. It is never shown again.
pub fn print_seed(seed: &attesta_crypto::SecretSeed) {
    println!();
    println!("  Seed phrase (shown once, store it safely):");
    println!("    {}", seed.expose());
}
