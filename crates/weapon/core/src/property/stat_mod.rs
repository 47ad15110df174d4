//! Trigger-stacked stat modifiers: `DamageMod`, `FireRateMod`, `RecoilMod`.

use crate::codec::{DocumentWriter, FieldValue};
use crate::context::{Context, ContextSet};
use crate::property::{DispatchCx, SyncProperty, WeaponEffect, WeaponProperty};
use crate::stack::{StackAccumulator, StackKind};
use crate::trigger::{TriggerCoordinator, TriggerHit, TriggerQueue};

/// Query quantity a [`StatMod`] refines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum StatTarget {
    Damage,
    FireRate,
    Recoil,
}

impl StatTarget {
    const fn kind_name(self) -> &'static str {
        match self {
            Self::Damage => "DamageMod",
            Self::FireRate => "FireRateMod",
            Self::Recoil => "RecoilMod",
        }
    }

    const fn contexts(self) -> ContextSet {
        match self {
            Self::Damage => ContextSet::DAMAGE,
            Self::FireRate => ContextSet::FIRE_RATE,
            Self::Recoil => ContextSet::RECOIL,
        }
    }
}

/// Multiplier applied to one query quantity while triggered stacks are alive.
///
/// Each trigger pass pushes one instance worth `1 + (Mod - 1) × Σ amounts`
/// that lives for `Duration` seconds. Live instances combine by `StackType`
/// and the result enters the query on `Layer` as a `StackLayer` contribution.
/// An `Add` contribution is expressed relative to the query base, so several
/// additive modifiers sum their percentages. Without a trigger, `Mod` applies
/// permanently.
///
/// | Field | Default |
/// |-------|---------|
/// | `Mod` | 1 |
/// | `Duration` | 0 |
/// | `StackType` | Add |
/// | `StackLayer` | Multiply |
/// | `Layer` | 0 |
/// | `Cap` | 0 (off) |
#[derive(Debug)]
pub struct StatMod {
    target: StatTarget,
    modifier: f32,
    duration: f32,
    stack_type: StackKind,
    stack_layer: StackKind,
    layer: i32,
    cap: f32,
    trigger: Option<TriggerCoordinator>,

    sync_id: u16,
    queue: TriggerQueue,
}

impl StatMod {
    pub fn new(target: StatTarget) -> Self {
        Self {
            target,
            modifier: 1.0,
            duration: 0.0,
            stack_type: StackKind::Add,
            stack_layer: StackKind::Multiply,
            layer: 0,
            cap: 0.0,
            trigger: None,
            sync_id: 0,
            queue: TriggerQueue::new(),
        }
    }

    pub fn damage() -> Self {
        Self::new(StatTarget::Damage)
    }

    pub fn fire_rate() -> Self {
        Self::new(StatTarget::FireRate)
    }

    pub fn recoil() -> Self {
        Self::new(StatTarget::Recoil)
    }

    #[must_use]
    pub fn with_modifier(mut self, modifier: f32) -> Self {
        self.modifier = modifier;
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration.max(0.0);
        self
    }

    #[must_use]
    pub fn with_stacking(mut self, stack_type: StackKind, stack_layer: StackKind) -> Self {
        self.stack_type = stack_type;
        self.stack_layer = stack_layer;
        self
    }

    #[must_use]
    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    #[must_use]
    pub fn with_cap(mut self, cap: f32) -> Self {
        self.cap = cap;
        self
    }

    #[must_use]
    pub fn with_trigger(mut self, trigger: TriggerCoordinator) -> Self {
        self.trigger = Some(trigger);
        self
    }

    pub fn target(&self) -> StatTarget {
        self.target
    }

    pub fn modifier(&self) -> f32 {
        self.modifier
    }

    /// Number of live instances.
    pub fn stacks(&self) -> usize {
        self.queue.len()
    }

    fn instance_value(&self, hits: &[TriggerHit]) -> f32 {
        let total: f32 = hits.iter().map(|hit| hit.amount).sum();
        1.0 + (self.modifier - 1.0) * total
    }

    fn push_instance(&mut self, value: f32, now: f32) {
        if self.stack_type == StackKind::None {
            self.queue.clear();
        }
        self.queue.push_for(value, now, self.duration);
    }

    fn current_value(&mut self, now: f32) -> Option<f32> {
        let value = match self.trigger {
            None => Some(self.modifier),
            Some(_) => self.queue.fold(now, self.stack_type, |value| value),
        }?;
        Some(self.apply_cap(value))
    }

    fn apply_cap(&self, value: f32) -> f32 {
        if self.cap <= 0.0 {
            value
        } else if self.modifier >= 1.0 {
            value.min(self.cap)
        } else {
            value.max(self.cap)
        }
    }

    fn contribute(&self, accumulator: &mut StackAccumulator, value: f32) {
        match self.stack_layer {
            StackKind::Add => accumulator.add_contribution(
                accumulator.base() * (value - 1.0),
                StackKind::Add,
                self.layer,
            ),
            kind => accumulator.add_contribution(value, kind, self.layer),
        }
    }

    fn template(&self) -> Self {
        Self {
            trigger: self.trigger.as_ref().map(TriggerCoordinator::clone_config),
            sync_id: 0,
            queue: TriggerQueue::new(),
            ..*self
        }
    }
}

impl WeaponProperty for StatMod {
    fn kind(&self) -> &'static str {
        self.target.kind_name()
    }

    fn contexts(&self) -> ContextSet {
        self.target.contexts()
    }

    fn invoke(&mut self, context: &mut Context, cx: &mut DispatchCx<'_>) {
        let Some(value) = self.current_value(cx.now()) else {
            return;
        };

        match (self.target, context) {
            (StatTarget::Damage, Context::Damage(query)) => {
                self.contribute(query.damage_mut(), value);
            }
            (StatTarget::FireRate, Context::FireRate(query))
            | (StatTarget::Recoil, Context::Recoil(query)) => {
                self.contribute(query.accumulator_mut(), value);
            }
            _ => {}
        }
    }

    fn trigger(&self) -> Option<&TriggerCoordinator> {
        self.trigger.as_ref()
    }

    fn trigger_mut(&mut self) -> Option<&mut TriggerCoordinator> {
        self.trigger.as_mut()
    }

    fn set_trigger(&mut self, trigger: TriggerCoordinator) {
        self.trigger = Some(trigger);
    }

    fn on_trigger_apply(&mut self, hits: &[TriggerHit], cx: &mut DispatchCx<'_>) {
        let value = self.instance_value(hits);
        self.push_instance(value, cx.now());
        cx.emit(WeaponEffect::SyncTrigger {
            sync_id: self.sync_id,
            value,
        });
    }

    fn on_trigger_reset(&mut self, _cx: &mut DispatchCx<'_>) {
        self.queue.clear();
    }

    fn as_sync_mut(&mut self) -> Option<&mut dyn SyncProperty> {
        if self.trigger.is_some() {
            Some(self)
        } else {
            None
        }
    }

    fn set_field(&mut self, key: &str, value: &FieldValue<'_>) {
        match key {
            "mod" | "modifier" | "multiplier" | "multi" => {
                if let Some(modifier) = value.as_f32() {
                    self.modifier = modifier;
                }
            }
            "duration" | "time" => {
                if let Some(duration) = value.as_f32() {
                    self.duration = duration.max(0.0);
                }
            }
            "stacktype" | "stack" => {
                if let Some(kind) = value.as_stack_kind() {
                    self.stack_type = kind;
                }
            }
            "stacklayer" | "stackmod" => {
                if let Some(kind) = value.as_stack_kind() {
                    self.stack_layer = kind;
                }
            }
            "layer" | "order" => {
                if let Some(layer) = value.as_i32() {
                    self.layer = layer;
                }
            }
            "cap" | "max" | "limit" => {
                if let Some(cap) = value.as_f32() {
                    self.cap = cap;
                }
            }
            _ => {}
        }
    }

    fn encode(&self, out: &mut DocumentWriter) {
        out.number("Mod", self.modifier)
            .number("Duration", self.duration)
            .string("StackType", self.stack_type.to_string())
            .string("StackLayer", self.stack_layer.to_string())
            .integer("Layer", i64::from(self.layer))
            .number("Cap", self.cap);
    }

    fn clone_template(&self) -> Box<dyn WeaponProperty> {
        Box::new(self.template())
    }

    fn reset_state(&mut self) {
        self.queue.clear();
        if let Some(trigger) = self.trigger.as_mut() {
            trigger.clear_state();
        }
    }
}

impl SyncProperty for StatMod {
    fn sync_id(&self) -> u16 {
        self.sync_id
    }

    fn set_sync_id(&mut self, id: u16) {
        self.sync_id = id;
    }

    fn apply_synced_value(&mut self, value: f32, cx: &mut DispatchCx<'_>) {
        self.push_instance(value, cx.now());
    }

    fn reset_synced(&mut self, _cx: &mut DispatchCx<'_>) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DamageQuery, StatQuery};
    use crate::damage::DamageType;
    use crate::property::test_support::Harness;
    use crate::trigger::{TriggerDefinition, TriggerName};

    fn kill_hit(amount: f32) -> TriggerHit {
        TriggerHit {
            amount,
            source: Context::Fire,
        }
    }

    fn on_kill() -> TriggerCoordinator {
        TriggerCoordinator::new(TriggerDefinition::new(TriggerName::Kill))
    }

    fn damage_after(module: &mut StatMod, harness: &mut Harness, base: f32) -> f32 {
        let mut context = Context::Damage(DamageQuery::new(base, DamageType::BULLET));
        module.invoke(&mut context, &mut harness.cx());
        match context {
            Context::Damage(query) => query.damage(),
            _ => unreachable!(),
        }
    }

    #[test]
    fn untriggered_modifier_is_permanent() {
        let mut harness = Harness::gun(10.0);
        let mut module = StatMod::fire_rate().with_modifier(2.0);
        let mut context = Context::FireRate(StatQuery::new(10.0));
        module.invoke(&mut context, &mut harness.cx());
        let Context::FireRate(query) = context else {
            unreachable!();
        };
        assert_eq!(query.value(), 20.0);
        assert!(module.trigger().is_none());
    }

    #[test]
    fn instances_expire_after_duration() {
        let mut harness = Harness::gun(10.0);
        let mut module = StatMod::damage()
            .with_modifier(1.5)
            .with_duration(2.0)
            .with_trigger(on_kill());

        assert_eq!(damage_after(&mut module, &mut harness, 10.0), 10.0);

        module.on_trigger_apply(&[kill_hit(1.0)], &mut harness.cx());
        assert_eq!(damage_after(&mut module, &mut harness, 10.0), 15.0);

        harness.clock.set(2.5);
        assert_eq!(damage_after(&mut module, &mut harness, 10.0), 10.0);
        assert_eq!(module.stacks(), 0);
    }

    #[test]
    fn additive_stacks_sum_their_bonuses() {
        let mut harness = Harness::gun(10.0);
        let mut module = StatMod::damage()
            .with_modifier(1.5)
            .with_duration(10.0)
            .with_trigger(on_kill());

        module.on_trigger_apply(&[kill_hit(1.0)], &mut harness.cx());
        module.on_trigger_apply(&[kill_hit(1.0)], &mut harness.cx());
        assert_eq!(damage_after(&mut module, &mut harness, 10.0), 20.0);

        // One pass with two hits is a single instance of 1 + 0.5 × 2.
        let mut single = StatMod::damage()
            .with_modifier(1.5)
            .with_duration(10.0)
            .with_trigger(on_kill());
        single.on_trigger_apply(&[kill_hit(1.0), kill_hit(1.0)], &mut harness.cx());
        assert_eq!(single.stacks(), 1);
        assert_eq!(damage_after(&mut single, &mut harness, 10.0), 20.0);
    }

    #[test]
    fn stack_type_none_keeps_one_instance() {
        let mut harness = Harness::gun(10.0);
        let mut module = StatMod::damage()
            .with_modifier(2.0)
            .with_duration(10.0)
            .with_stacking(StackKind::None, StackKind::Multiply)
            .with_trigger(on_kill());

        for _ in 0..3 {
            module.on_trigger_apply(&[kill_hit(1.0)], &mut harness.cx());
        }
        assert_eq!(module.stacks(), 1);
        assert_eq!(damage_after(&mut module, &mut harness, 10.0), 20.0);
    }

    #[test]
    fn cap_bounds_the_folded_value() {
        let mut harness = Harness::gun(10.0);
        let mut module = StatMod::damage()
            .with_modifier(2.0)
            .with_duration(10.0)
            .with_stacking(StackKind::Multiply, StackKind::Multiply)
            .with_cap(3.0)
            .with_trigger(on_kill());

        for _ in 0..4 {
            module.on_trigger_apply(&[kill_hit(1.0)], &mut harness.cx());
        }
        assert_eq!(damage_after(&mut module, &mut harness, 10.0), 30.0);
    }

    #[test]
    fn apply_emits_sync_value() {
        let mut harness = Harness::gun(10.0);
        let mut module = StatMod::recoil()
            .with_modifier(0.5)
            .with_duration(1.0)
            .with_trigger(on_kill());
        module.set_sync_id(3);

        module.on_trigger_apply(&[kill_hit(1.0)], &mut harness.cx());
        assert_eq!(
            harness.effects,
            vec![WeaponEffect::SyncTrigger {
                sync_id: 3,
                value: 0.5
            }]
        );
    }

    #[test]
    fn synced_values_feed_the_queue() {
        let mut harness = Harness::gun(10.0);
        let mut module = StatMod::damage().with_duration(5.0).with_trigger(on_kill());
        let sync = module.as_sync_mut().unwrap();
        sync.apply_synced_value(1.25, &mut harness.cx());
        assert_eq!(damage_after(&mut module, &mut harness, 8.0), 10.0);

        module.reset_synced(&mut harness.cx());
        assert_eq!(module.stacks(), 0);
        assert!(harness.effects.is_empty());
    }

    #[test]
    fn clone_template_isolates_state() {
        let mut harness = Harness::gun(10.0);
        let mut original = StatMod::damage()
            .with_modifier(3.0)
            .with_duration(10.0)
            .with_trigger(on_kill());
        original.on_trigger_apply(&[kill_hit(1.0)], &mut harness.cx());

        let mut copy = original.clone_template();
        let mut context = Context::Damage(DamageQuery::new(10.0, DamageType::BULLET));
        copy.invoke(&mut context, &mut harness.cx());
        let Context::Damage(query) = context else {
            unreachable!();
        };
        assert_eq!(query.damage(), 10.0);
        assert_eq!(original.stacks(), 1);
        assert_eq!(copy.kind(), "DamageMod");
    }
}
