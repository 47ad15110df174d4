//! Compact trigger outcomes exchanged between peers.
//!
//! The authoritative peer evaluates triggers locally and broadcasts each
//! outcome as a [`SyncMessage`]. Remote copies of the weapon skip local
//! evaluation and apply the messages instead. Transport is up to the host.

use serde::{Deserialize, Serialize};
use weapon_core::{WeaponEffect, WeaponId};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncPayload {
    /// A trigger applied with this value.
    Trigger { value: f32 },
    /// The participant's trigger reset.
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyncMessage {
    pub weapon: WeaponId,
    pub sync_id: u16,
    pub payload: SyncPayload,
}

impl SyncMessage {
    /// Broadcast message for a sync effect, `None` for any other effect.
    pub fn from_effect(weapon: WeaponId, effect: &WeaponEffect) -> Option<Self> {
        let (sync_id, payload) = match *effect {
            WeaponEffect::SyncTrigger { sync_id, value } => (sync_id, SyncPayload::Trigger { value }),
            WeaponEffect::SyncReset { sync_id } => (sync_id, SyncPayload::Reset),
            _ => return None,
        };
        Some(Self {
            weapon,
            sync_id,
            payload,
        })
    }

    /// Extracts sync messages from `effects` in emission order.
    pub fn collect(weapon: WeaponId, effects: &[WeaponEffect]) -> Vec<Self> {
        effects
            .iter()
            .filter_map(|effect| Self::from_effect(weapon, effect))
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
