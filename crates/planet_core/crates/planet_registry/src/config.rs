use planet_utils::time::{Millis, SECOND};
use serde::{Deserialize, Serialize};

/// What `decompress` rebuilds from an archived payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveFidelity {
    /// Template defaults of the stored tags plus a fresh orbit distance.
    #[default]
    Approximate,
    /// The exact entity that was archived.
    Lossless,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub max_planets: usize,
    pub max_loaded: usize,
    pub archive_after_secs: u64,
    pub delete_after_secs: u64,
    pub maintenance_cooldown_secs: u64,
    pub archive_fidelity: ArchiveFidelity,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_planets: 100,
            max_loaded: 10,
            archive_after_secs: 24 * 60 * 60,
            delete_after_secs: 7 * 24 * 60 * 60,
            maintenance_cooldown_secs: 5 * 60,
            archive_fidelity: ArchiveFidelity::Approximate,
        }
    }
}

impl RegistryConfig {
    pub fn archive_after(&self) -> Millis {
        self.archive_after_secs.saturating_mul(SECOND)
    }

    pub fn delete_after(&self) -> Millis {
        self.delete_after_secs.saturating_mul(SECOND)
    }

    pub fn maintenance_cooldown(&self) -> Millis {
        self.maintenance_cooldown_secs.saturating_mul(SECOND)
    }
}
