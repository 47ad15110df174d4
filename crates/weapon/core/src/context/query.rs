//! Query contexts: base values refined by subscribers.

use crate::context::TargetId;
use crate::damage::DamageType;
use crate::stack::{StackAccumulator, StackKind};

/// Single-quantity query (fire rate, recoil).
#[derive(Clone, Debug, PartialEq)]
pub struct StatQuery {
    value: StackAccumulator,
}

impl StatQuery {
    pub fn new(base: f32) -> Self {
        Self {
            value: StackAccumulator::new(base),
        }
    }

    pub fn base(&self) -> f32 {
        self.value.base()
    }

    pub fn add_mod(&mut self, amount: f32, kind: StackKind) {
        self.value.add_mod(amount, kind);
    }

    pub fn add_contribution(&mut self, amount: f32, kind: StackKind, layer: i32) {
        self.value.add_contribution(amount, kind, layer);
    }

    pub fn accumulator(&self) -> &StackAccumulator {
        &self.value
    }

    pub fn accumulator_mut(&mut self) -> &mut StackAccumulator {
        &mut self.value
    }

    /// Folded result.
    pub fn value(&self) -> f32 {
        self.value.value()
    }
}

/// Damage query issued immediately before raw damage is applied.
///
/// Carries three independent accumulators; modules pick the one they refine.
#[derive(Clone, Debug, PartialEq)]
pub struct DamageQuery {
    damage: StackAccumulator,
    precision: StackAccumulator,
    stagger: StackAccumulator,
    damage_type: DamageType,
    target: Option<TargetId>,
}

impl DamageQuery {
    /// Query with a base damage and neutral precision/stagger multipliers.
    pub fn new(damage: f32, damage_type: DamageType) -> Self {
        Self {
            damage: StackAccumulator::new(damage),
            precision: StackAccumulator::new(1.0),
            stagger: StackAccumulator::new(1.0),
            damage_type,
            target: None,
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: TargetId) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_multipliers(mut self, precision: f32, stagger: f32) -> Self {
        self.precision = StackAccumulator::new(precision);
        self.stagger = StackAccumulator::new(stagger);
        self
    }

    pub fn damage_mut(&mut self) -> &mut StackAccumulator {
        &mut self.damage
    }

    pub fn precision_mut(&mut self) -> &mut StackAccumulator {
        &mut self.precision
    }

    pub fn stagger_mut(&mut self) -> &mut StackAccumulator {
        &mut self.stagger
    }

    pub fn damage(&self) -> f32 {
        self.damage.value()
    }

    pub fn precision(&self) -> f32 {
        self.precision.value()
    }

    pub fn stagger(&self) -> f32 {
        self.stagger.value()
    }

    pub fn base_damage(&self) -> f32 {
        self.damage.base()
    }

    pub fn damage_type(&self) -> DamageType {
        self.damage_type
    }

    pub fn target(&self) -> Option<TargetId> {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_query_accumulators_are_independent() {
        let mut query = DamageQuery::new(20.0, DamageType::BULLET).with_multipliers(2.0, 1.0);
        query.damage_mut().add_mod(1.5, StackKind::Multiply);
        query.stagger_mut().add_mod(0.5, StackKind::Add);

        assert_eq!(query.damage(), 30.0);
        assert_eq!(query.base_damage(), 20.0);
        assert_eq!(query.precision(), 2.0);
        assert_eq!(query.stagger(), 1.5);
    }
}
