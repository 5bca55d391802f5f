use serde::{Deserialize, Serialize};

/// Argon2id cost parameters used when sealing secrets under a password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Number of passes.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

/// Runtime configuration for the platform services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Credits consumed for each credential issuance.
    #[serde(default = "default_issuance_fee")]
    pub issuance_fee: u64,
    /// Credits an organization pays to add a member. Zero means free.
    #[serde(default)]
    pub member_fee: u64,
    /// Application-wide key for the legacy sealing mode. `None` disables it.
    #[serde(default)]
    pub legacy_app_key: Option<String>,
    /// Password KDF cost.
    #[serde(default)]
    pub kdf: KdfConfig,
}

fn default_memory_kib() -> u32 {
    19_456
}
fn default_iterations() -> u32 {
    2
}
fn default_parallelism() -> u32 {
    1
}
fn default_issuance_fee() -> u64 {
    1
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

impl KdfConfig {
    /// Smallest parameters Argon2 accepts. Only for tests.
    pub fn insecure_fast() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            issuance_fee: default_issuance_fee(),
            member_fee: 0,
            legacy_app_key: None,
            kdf: KdfConfig::default(),
        }
    }
}
