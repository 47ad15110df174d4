//! Payloads of trigger-bearing contexts.

use crate::damage::DamageType;

/// World-space vector as supplied by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const FORWARD: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

impl core::ops::Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

/// Host identity of a damageable target (enemy, player, lock).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetId(pub u64);

/// A projectile or swing landing anywhere.
#[derive(Clone, Debug, PartialEq)]
pub struct HitContext {
    position: Vec3,
    direction: Vec3,
    falloff: f32,
    damage_type: DamageType,
    damageable: bool,
}

impl HitContext {
    /// A landing on level geometry.
    pub fn new(position: Vec3, direction: Vec3, falloff: f32, damage_type: DamageType) -> Self {
        Self {
            position,
            direction,
            falloff,
            damage_type,
            damageable: false,
        }
    }

    /// Marks the landing as striking a damageable.
    #[must_use]
    pub fn on_damageable(mut self) -> Self {
        self.damageable = true;
        self
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Distance falloff multiplier in `[0, 1]`.
    pub fn falloff(&self) -> f32 {
        self.falloff
    }

    pub fn damage_type(&self) -> DamageType {
        self.damage_type
    }

    pub fn is_damageable(&self) -> bool {
        self.damageable
    }
}

/// A hit on a damageable target, used both before and after damage applies.
#[derive(Clone, Debug, PartialEq)]
pub struct DamageableHitContext {
    hit: HitContext,
    target: TargetId,
    damage: f32,
    backstab: f32,
}

impl DamageableHitContext {
    pub fn new(hit: HitContext, target: TargetId, damage: f32) -> Self {
        Self {
            hit: hit.on_damageable(),
            target,
            damage,
            backstab: 1.0,
        }
    }

    /// Attaches the backstab multiplier computed by the host.
    #[must_use]
    pub fn with_backstab(mut self, backstab: f32) -> Self {
        self.backstab = backstab;
        self
    }

    pub fn hit(&self) -> &HitContext {
        &self.hit
    }

    pub fn target(&self) -> TargetId {
        self.target
    }

    /// Damage dealt (or about to be dealt) by this hit.
    pub fn damage(&self) -> f32 {
        self.damage
    }

    pub fn backstab(&self) -> f32 {
        self.backstab
    }

    pub fn damage_type(&self) -> DamageType {
        self.hit.damage_type
    }
}

/// Release of a charged melee swing.
#[derive(Clone, Debug, PartialEq)]
pub struct ChargeContext {
    charge: f32,
    damage_type: DamageType,
}

impl ChargeContext {
    pub fn new(charge: f32, damage_type: DamageType) -> Self {
        Self {
            charge,
            damage_type,
        }
    }

    /// Charge fraction in `[0, 1]`.
    pub fn charge(&self) -> f32 {
        self.charge
    }

    pub fn damage_type(&self) -> DamageType {
        self.damage_type
    }
}

/// A kill attributed to this weapon, reconstructed from the last hit.
#[derive(Clone, Debug, PartialEq)]
pub struct KillContext {
    position: Vec3,
    direction: Vec3,
    falloff: f32,
    backstab: f32,
    target: TargetId,
    damage_type: DamageType,
}

impl KillContext {
    pub fn new(
        position: Vec3,
        direction: Vec3,
        falloff: f32,
        backstab: f32,
        target: TargetId,
        damage_type: DamageType,
    ) -> Self {
        Self {
            position,
            direction,
            falloff,
            backstab,
            target,
            damage_type,
        }
    }

    /// Builds the kill from the hit that landed the final blow.
    pub fn from_hit(hit: &DamageableHitContext) -> Self {
        Self::new(
            hit.hit.position,
            hit.hit.direction,
            hit.hit.falloff,
            hit.backstab,
            hit.target,
            hit.hit.damage_type,
        )
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn falloff(&self) -> f32 {
        self.falloff
    }

    pub fn backstab(&self) -> f32 {
        self.backstab
    }

    pub fn target(&self) -> TargetId {
        self.target
    }

    pub fn damage_type(&self) -> DamageType {
        self.damage_type
    }
}
