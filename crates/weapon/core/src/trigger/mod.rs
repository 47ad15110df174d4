//! Trigger evaluation: converting raw gameplay events into scalar weights.
//!
//! A [`TriggerDefinition`] is a filter plus weight function over one
//! [`TriggerName`]. A [`TriggerCoordinator`] owns a module's definitions and
//! gathers every non-zero weight seen during a dispatch pass, so the owning
//! module receives them in one `on_trigger_apply` call. Modules that stack
//! over time keep the resulting amounts in a [`TriggerQueue`].

mod coordinator;
mod definition;
mod queue;

pub use coordinator::{TriggerCoordinator, TriggerHit};
pub use definition::TriggerDefinition;
pub use queue::{TriggerInstance, TriggerQueue};

use crate::codec::normalize_key;
use crate::context::ContextKind;
use crate::damage::DamageType;

/// Closed set of trigger kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TriggerName {
    PreFire,
    Fire,
    Aim,
    AimEnd,
    ReloadStart,
    Reload,
    Wield,
    BulletLanded,
    Hit,
    Charge,
    Damage,
    Kill,
}

impl TriggerName {
    /// Mask a definition starts with; landings default to bullets.
    pub const fn default_damage_type(self) -> DamageType {
        match self {
            Self::BulletLanded => DamageType::BULLET,
            _ => DamageType::empty(),
        }
    }

    /// Context kind that raises this trigger.
    pub const fn context_kind(self) -> ContextKind {
        match self {
            Self::PreFire => ContextKind::PreFire,
            Self::Fire => ContextKind::Fire,
            Self::Aim => ContextKind::Aim,
            Self::AimEnd => ContextKind::AimEnd,
            Self::ReloadStart => ContextKind::ReloadStart,
            Self::Reload => ContextKind::Reload,
            Self::Wield => ContextKind::Wield,
            Self::BulletLanded => ContextKind::PreHit,
            Self::Hit => ContextKind::PreHitDamageable,
            Self::Charge => ContextKind::Charge,
            Self::Damage => ContextKind::HitDamageable,
            Self::Kill => ContextKind::PostKill,
        }
    }

    /// Parses a trigger name, returning any damage-type tags embedded in it.
    ///
    /// Matching ignores case, whitespace and a leading `"on"`. Compound names
    /// such as `"Weakspot Hit"` or `"OnExplosiveKill"` yield their tags, and
    /// landing triggers are limited to their bullet or melee tag.
    pub fn parse(text: &str) -> Option<(Self, DamageType)> {
        let normalized = normalize_key(text);
        let name = normalized.strip_prefix("on").unwrap_or(&normalized);

        let basic = match name {
            "prefire" | "preshot" | "preswing" => Some(Self::PreFire),
            "fire" | "shot" | "swing" => Some(Self::Fire),
            "aim" | "zoomin" => Some(Self::Aim),
            "aimend" | "zoomout" => Some(Self::AimEnd),
            "reloadstart" | "startreload" => Some(Self::ReloadStart),
            "reload" => Some(Self::Reload),
            "wield" => Some(Self::Wield),
            _ => None,
        };
        if let Some(trigger) = basic {
            return Some((trigger, DamageType::empty()));
        }

        match name {
            "bulletlanded" | "landedbullet" => {
                return Some((Self::BulletLanded, Self::BulletLanded.default_damage_type()));
            }
            "meleelanded" | "landedmelee" => return Some((Self::BulletLanded, DamageType::MELEE)),
            _ => {}
        }

        let tagged = if name.contains("hit") {
            Self::Hit
        } else if name.contains("charge") {
            Self::Charge
        } else if name.contains("damage") {
            Self::Damage
        } else if name.contains("kill") {
            Self::Kill
        } else {
            return None;
        };
        Some((tagged, DamageType::scan_name(text)))
    }
}
