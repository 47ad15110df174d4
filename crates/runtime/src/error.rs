//! Errors surfaced by the weapon runtime.

use std::path::PathBuf;

use thiserror::Error;
use weapon_core::WeaponId;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("weapon {0:?} is not tracked by the manager")]
    UnknownWeapon(WeaponId),

    #[error("weapon {weapon:?} has no sync participant {sync_id}")]
    UnknownSyncId { weapon: WeaponId, sync_id: u16 },

    #[error("no custom data for {category} archetype {archetype_id}")]
    MissingData {
        category: weapon_core::WeaponCategory,
        archetype_id: u32,
    },

    #[error("environment variable {key} has invalid value {value:?}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("failed to load weapon content from {}", path.display())]
    Content {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}
