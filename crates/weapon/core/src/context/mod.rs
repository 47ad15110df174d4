//! Closed catalog of event payloads dispatched to property modules.
//!
//! A [`Context`] is built by the host immediately before dispatch, passed by
//! reference through every subscriber and dropped afterwards. Input fields are
//! fixed at construction. Query variants additionally carry accumulators that
//! modules refine.
//!
//! # Categories
//!
//! - **Lifecycle**: setup/teardown and per-frame notifications
//! - **Trigger-bearing**: gameplay events a [`TriggerDefinition`] can weigh
//! - **Query**: fire rate, damage and recoil values refined by modules
//!
//! [`TriggerDefinition`]: crate::trigger::TriggerDefinition

mod events;
mod query;

pub use events::{ChargeContext, DamageableHitContext, HitContext, KillContext, TargetId, Vec3};
pub use query::{DamageQuery, StatQuery};

use bitflags::bitflags;
use strum::{EnumCount, IntoEnumIterator};

use crate::damage::DamageType;
use crate::trigger::TriggerName;

/// Discriminant of every context type in the catalog.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
    strum::EnumCount,
    strum::EnumIter,
)]
pub enum ContextKind {
    Setup,
    Clear,
    OwnerSet,
    Update,
    Enable,
    Disable,
    PreStartFire,
    FireCanceled,
    PreFire,
    Fire,
    Aim,
    AimEnd,
    ReloadStart,
    Reload,
    Wield,
    PreHit,
    PreHitDamageable,
    Charge,
    HitDamageable,
    PostKill,
    FireRate,
    Damage,
    Recoil,
}

impl ContextKind {
    /// Number of context kinds, used to size per-kind dispatch tables.
    pub const COUNT: usize = <Self as EnumCount>::COUNT;

    /// Trigger kind raised by this context, if it is trigger-bearing.
    pub const fn trigger_name(self) -> Option<TriggerName> {
        match self {
            Self::PreFire => Some(TriggerName::PreFire),
            Self::Fire => Some(TriggerName::Fire),
            Self::Aim => Some(TriggerName::Aim),
            Self::AimEnd => Some(TriggerName::AimEnd),
            Self::ReloadStart => Some(TriggerName::ReloadStart),
            Self::Reload => Some(TriggerName::Reload),
            Self::Wield => Some(TriggerName::Wield),
            Self::PreHit => Some(TriggerName::BulletLanded),
            Self::PreHitDamageable => Some(TriggerName::Hit),
            Self::Charge => Some(TriggerName::Charge),
            Self::HitDamageable => Some(TriggerName::Damage),
            Self::PostKill => Some(TriggerName::Kill),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        <Self as IntoEnumIterator>::iter()
    }
}

bitflags! {
    /// Set of context kinds a module subscribes to.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ContextSet: u32 {
        const SETUP              = 1 << ContextKind::Setup as u32;
        const CLEAR              = 1 << ContextKind::Clear as u32;
        const OWNER_SET          = 1 << ContextKind::OwnerSet as u32;
        const UPDATE             = 1 << ContextKind::Update as u32;
        const ENABLE             = 1 << ContextKind::Enable as u32;
        const DISABLE            = 1 << ContextKind::Disable as u32;
        const PRE_START_FIRE     = 1 << ContextKind::PreStartFire as u32;
        const FIRE_CANCELED      = 1 << ContextKind::FireCanceled as u32;
        const PRE_FIRE           = 1 << ContextKind::PreFire as u32;
        const FIRE               = 1 << ContextKind::Fire as u32;
        const AIM                = 1 << ContextKind::Aim as u32;
        const AIM_END            = 1 << ContextKind::AimEnd as u32;
        const RELOAD_START       = 1 << ContextKind::ReloadStart as u32;
        const RELOAD             = 1 << ContextKind::Reload as u32;
        const WIELD              = 1 << ContextKind::Wield as u32;
        const PRE_HIT            = 1 << ContextKind::PreHit as u32;
        const PRE_HIT_DAMAGEABLE = 1 << ContextKind::PreHitDamageable as u32;
        const CHARGE             = 1 << ContextKind::Charge as u32;
        const HIT_DAMAGEABLE     = 1 << ContextKind::HitDamageable as u32;
        const POST_KILL          = 1 << ContextKind::PostKill as u32;
        const FIRE_RATE          = 1 << ContextKind::FireRate as u32;
        const DAMAGE             = 1 << ContextKind::Damage as u32;
        const RECOIL             = 1 << ContextKind::Recoil as u32;
    }
}

impl ContextSet {
    pub fn has(self, kind: ContextKind) -> bool {
        self.contains(kind.into())
    }

    pub fn kinds(self) -> impl Iterator<Item = ContextKind> {
        ContextKind::iter().filter(move |kind| self.has(*kind))
    }
}

impl From<ContextKind> for ContextSet {
    fn from(kind: ContextKind) -> Self {
        Self::from_bits_retain(1 << kind as u32)
    }
}

/// A typed event value delivered through the dispatch registry.
#[derive(Clone, Debug, PartialEq)]
pub enum Context {
    /// Properties were just registered on the weapon.
    Setup,
    /// The weapon is being unregistered; restore anything changed at setup.
    Clear,
    /// The owning agent became known.
    OwnerSet,
    /// Per-frame tick while the weapon is registered.
    Update,
    Enable,
    Disable,
    /// The trigger was pulled after a pause in firing.
    PreStartFire,
    /// An in-flight shot was canceled by the host.
    FireCanceled,

    /// A shot is about to fire, before ammo is decremented.
    PreFire,
    /// A shot was fired.
    Fire,
    Aim,
    AimEnd,
    ReloadStart,
    Reload,
    Wield,
    /// A projectile or swing landed on anything.
    PreHit(HitContext),
    /// A hit landed on a damageable target, before damage is applied.
    PreHitDamageable(DamageableHitContext),
    /// A melee charge was released.
    Charge(ChargeContext),
    /// Damage was dealt to a damageable target.
    HitDamageable(DamageableHitContext),
    /// A target died to this weapon.
    PostKill(KillContext),

    FireRate(StatQuery),
    Damage(DamageQuery),
    Recoil(StatQuery),
}

impl Context {
    pub fn kind(&self) -> ContextKind {
        match self {
            Self::Setup => ContextKind::Setup,
            Self::Clear => ContextKind::Clear,
            Self::OwnerSet => ContextKind::OwnerSet,
            Self::Update => ContextKind::Update,
            Self::Enable => ContextKind::Enable,
            Self::Disable => ContextKind::Disable,
            Self::PreStartFire => ContextKind::PreStartFire,
            Self::FireCanceled => ContextKind::FireCanceled,
            Self::PreFire => ContextKind::PreFire,
            Self::Fire => ContextKind::Fire,
            Self::Aim => ContextKind::Aim,
            Self::AimEnd => ContextKind::AimEnd,
            Self::ReloadStart => ContextKind::ReloadStart,
            Self::Reload => ContextKind::Reload,
            Self::Wield => ContextKind::Wield,
            Self::PreHit(_) => ContextKind::PreHit,
            Self::PreHitDamageable(_) => ContextKind::PreHitDamageable,
            Self::Charge(_) => ContextKind::Charge,
            Self::HitDamageable(_) => ContextKind::HitDamageable,
            Self::PostKill(_) => ContextKind::PostKill,
            Self::FireRate(_) => ContextKind::FireRate,
            Self::Damage(_) => ContextKind::Damage,
            Self::Recoil(_) => ContextKind::Recoil,
        }
    }

    pub fn trigger_name(&self) -> Option<TriggerName> {
        self.kind().trigger_name()
    }

    /// Damage-type tag of the event, empty for untagged contexts.
    pub fn damage_type(&self) -> DamageType {
        match self {
            Self::PreHit(hit) => hit.damage_type(),
            Self::PreHitDamageable(hit) | Self::HitDamageable(hit) => hit.damage_type(),
            Self::Charge(charge) => charge.damage_type(),
            Self::PostKill(kill) => kill.damage_type(),
            Self::Damage(query) => query.damage_type(),
            _ => DamageType::empty(),
        }
    }

    /// Raw magnitude a trigger scales: damage dealt, charge fraction, or 1.
    pub fn trigger_magnitude(&self) -> f32 {
        match self {
            Self::HitDamageable(hit) => hit.damage(),
            Self::Charge(charge) => charge.charge(),
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_distinct_bit() {
        let mut seen = ContextSet::empty();
        for kind in ContextKind::iter() {
            let bit = ContextSet::from(kind);
            assert!(!seen.intersects(bit), "{kind} reuses a bit");
            seen |= bit;
        }
        assert_eq!(seen, ContextSet::all());
        assert_eq!(ContextKind::COUNT, 23);
    }

    #[test]
    fn set_iterates_member_kinds() {
        let set = ContextSet::FIRE_RATE | ContextSet::DAMAGE | ContextSet::SETUP;
        let kinds: Vec<_> = set.kinds().collect();
        assert_eq!(
            kinds,
            vec![ContextKind::Setup, ContextKind::FireRate, ContextKind::Damage]
        );
        assert!(set.has(ContextKind::Damage));
        assert!(!set.has(ContextKind::Recoil));
    }

    #[test]
    fn trigger_bearing_contexts_map_to_trigger_names() {
        assert_eq!(Context::PreFire.trigger_name(), Some(TriggerName::PreFire));
        assert_eq!(
            ContextKind::HitDamageable.trigger_name(),
            Some(TriggerName::Damage)
        );
        assert_eq!(Context::Update.trigger_name(), None);
        assert_eq!(
            Context::FireRate(StatQuery::new(1.0)).trigger_name(),
            None
        );
    }

    #[test]
    fn magnitude_reflects_payload() {
        let hit = DamageableHitContext::new(
            HitContext::new(Vec3::ZERO, Vec3::FORWARD, 1.0, DamageType::BULLET),
            TargetId(7),
            42.0,
        );
        assert_eq!(Context::HitDamageable(hit.clone()).trigger_magnitude(), 42.0);
        assert_eq!(Context::PreHitDamageable(hit).trigger_magnitude(), 1.0);
        assert_eq!(
            Context::Charge(ChargeContext::new(0.75, DamageType::MELEE)).trigger_magnitude(),
            0.75
        );
    }
}
