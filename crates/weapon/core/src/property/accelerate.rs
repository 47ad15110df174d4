use crate::codec::{DocumentWriter, FieldValue};
use crate::config::EngineConfig;
use crate::context::{Context, ContextSet};
use crate::property::{DispatchCx, WeaponCategory, WeaponProperty};
use crate::stack::StackKind;
use crate::trigger::{TriggerCoordinator, TriggerHit};

/// Fire-rate and damage ramp driven by sustained fire.
///
/// Progress climbs from 0 to 1 over `AccelTime` seconds of firing and decays
/// over `DecelTime` once firing pauses for longer than `DecelDelay`. The
/// modifier at a given progress `p` is
///
/// ```text
/// lerp(1, end, p ^ AccelExponent)     default
/// end ^ p                             AccelExponent = "e"
/// ```
///
/// Its trigger, when configured, resets progress to zero.
#[derive(Debug)]
pub struct Accelerate {
    end_fire_rate: f32,
    end_fire_rate_mod: f32,
    fire_rate_stack_layer: StackKind,
    end_damage_mod: f32,
    damage_stack_layer: StackKind,
    accel_time: f32,
    decel_time: f32,
    decel_delay: f32,
    accel_exponent: f32,
    continuous_growth: bool,
    trigger: Option<TriggerCoordinator>,

    progress: f32,
    last_update: Option<f32>,
    saved_progress: f32,
    saved_update: Option<f32>,
}

impl Default for Accelerate {
    fn default() -> Self {
        Self {
            end_fire_rate: 0.0,
            end_fire_rate_mod: 1.0,
            fire_rate_stack_layer: StackKind::Multiply,
            end_damage_mod: 1.0,
            damage_stack_layer: StackKind::Multiply,
            accel_time: 1.0,
            decel_time: EngineConfig::MIN_RAMP_TIME,
            decel_delay: 0.0,
            accel_exponent: 1.0,
            continuous_growth: false,
            trigger: None,
            progress: 0.0,
            last_update: None,
            saved_progress: 0.0,
            saved_update: None,
        }
    }
}

impl Accelerate {
    #[must_use]
    pub fn with_end_fire_rate_mod(mut self, modifier: f32) -> Self {
        self.end_fire_rate_mod = modifier.max(EngineConfig::MIN_FIRE_RATE);
        self
    }

    #[must_use]
    pub fn with_end_damage_mod(mut self, modifier: f32) -> Self {
        self.end_damage_mod = modifier;
        self
    }

    #[must_use]
    pub fn with_ramp(mut self, accel_time: f32, decel_time: f32, decel_delay: f32) -> Self {
        self.accel_time = accel_time.max(EngineConfig::MIN_RAMP_TIME);
        self.decel_time = decel_time.max(EngineConfig::MIN_RAMP_TIME);
        self.decel_delay = decel_delay;
        self
    }

    #[must_use]
    pub fn with_exponent(mut self, exponent: f32) -> Self {
        self.accel_exponent = exponent;
        self.continuous_growth = false;
        self
    }

    #[must_use]
    pub fn with_continuous_growth(mut self) -> Self {
        self.continuous_growth = true;
        self
    }

    /// Current ramp progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    fn fire_rate_target(&self, base_fire_rate: f32) -> f32 {
        if self.end_fire_rate > 0.0 {
            self.end_fire_rate / base_fire_rate.max(EngineConfig::MIN_FIRE_RATE)
        } else {
            self.end_fire_rate_mod
        }
    }

    fn ramp(&self, end: f32) -> f32 {
        if self.continuous_growth {
            end.powf(self.progress)
        } else {
            let t = self.progress.powf(self.accel_exponent);
            1.0 + (end - 1.0) * t
        }
    }

    /// Full update at the start of a shot: credits at most one shot interval
    /// of acceleration, then decays for any pause beyond `DecelDelay`.
    fn update_progress(&mut self, cx: &DispatchCx<'_>) {
        self.saved_progress = self.progress;
        self.saved_update = self.last_update;

        let now = cx.now();
        let mut elapsed = now - self.last_update.unwrap_or(now);
        let shot_interval =
            1.0 / cx.weapon().current_fire_rate.max(EngineConfig::MIN_FIRE_RATE);
        let accel = shot_interval.min(elapsed);

        self.progress = (self.progress + accel / self.accel_time).min(1.0);

        elapsed -= accel + cx.delta();
        if elapsed > 0.0 && elapsed > self.decel_delay {
            self.progress =
                (self.progress - (elapsed - self.decel_delay) / self.decel_time).max(0.0);
        }
        self.last_update = Some(now);
    }

    fn restart(&mut self, now: f32) {
        self.progress = 0.0;
        self.last_update = Some(now);
    }
}

impl WeaponProperty for Accelerate {
    fn kind(&self) -> &'static str {
        "Accelerate"
    }

    fn contexts(&self) -> ContextSet {
        ContextSet::PRE_START_FIRE
            | ContextSet::PRE_FIRE
            | ContextSet::FIRE_CANCELED
            | ContextSet::FIRE_RATE
            | ContextSet::DAMAGE
    }

    fn invoke(&mut self, context: &mut Context, cx: &mut DispatchCx<'_>) {
        match context {
            Context::PreStartFire | Context::PreFire => self.update_progress(cx),
            Context::FireCanceled => {
                self.progress = self.saved_progress;
                self.last_update = self.saved_update;
            }
            // Fire-rate refresh runs once per shot while the trigger is held,
            // so the whole gap since the last update counts as acceleration.
            Context::FireRate(query) => {
                let now = cx.now();
                let elapsed = now - self.last_update.unwrap_or(now);
                self.progress = (self.progress + elapsed / self.accel_time).min(1.0);
                self.last_update = Some(now);

                let target = self.fire_rate_target(query.base());
                if target != 1.0 {
                    query.add_mod(self.ramp(target), self.fire_rate_stack_layer);
                }
            }
            Context::Damage(query) => {
                if self.end_damage_mod != 1.0 {
                    query
                        .damage_mut()
                        .add_mod(self.ramp(self.end_damage_mod), self.damage_stack_layer);
                }
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

    fn on_trigger_apply(&mut self, _hits: &[TriggerHit], cx: &mut DispatchCx<'_>) {
        self.restart(cx.now());
    }

    fn on_trigger_reset(&mut self, cx: &mut DispatchCx<'_>) {
        self.restart(cx.now());
    }

    fn set_field(&mut self, key: &str, value: &FieldValue<'_>) {
        let number = value.as_f32();
        match key {
            "endshotdelay" | "accelshotdelay" => {
                if let Some(delay) = number {
                    self.end_fire_rate = 1.0 / delay.max(EngineConfig::MIN_SHOT_DELAY);
                }
            }
            "endfirerate" | "accelfirerate" => {
                if let Some(rate) = number {
                    self.end_fire_rate = rate;
                }
            }
            "endfireratemod" | "accelfireratemod" | "fireratemod" => {
                if let Some(modifier) = number {
                    self.end_fire_rate_mod = modifier.max(EngineConfig::MIN_FIRE_RATE);
                }
            }
            "fireratestacklayer" => {
                if let Some(kind) = value.as_stack_kind() {
                    self.fire_rate_stack_layer = kind;
                }
            }
            "enddamagemod" | "acceldamagemod" | "damagemod" => {
                if let Some(modifier) = number {
                    self.end_damage_mod = modifier;
                }
            }
            "damagestacklayer" | "stacklayer" | "layer" => {
                if let Some(kind) = value.as_stack_kind() {
                    self.damage_stack_layer = kind;
                }
            }
            "acceltime" => {
                if let Some(time) = number {
                    self.accel_time = time.max(EngineConfig::MIN_RAMP_TIME);
                }
            }
            "deceltime" => {
                if let Some(time) = number {
                    self.decel_time = time.max(EngineConfig::MIN_RAMP_TIME);
                }
            }
            "deceldelay" => {
                if let Some(delay) = number {
                    self.decel_delay = delay;
                }
            }
            "accelexponent" | "exponent" => match value.as_str() {
                Some(text) if text.trim().eq_ignore_ascii_case("e") => {
                    self.continuous_growth = true;
                }
                _ => {
                    if let Some(exponent) = number {
                        self.accel_exponent = exponent;
                        self.continuous_growth = false;
                    }
                }
            },
            "resettrigger" | "resettriggertype" => {
                if let Some(trigger) = crate::codec::decode_trigger(value.raw()) {
                    self.trigger = Some(trigger);
                }
            }
            _ => {}
        }
    }

    fn encode(&self, out: &mut DocumentWriter) {
        out.number("EndFireRate", self.end_fire_rate)
            .number("EndFireRateMod", self.end_fire_rate_mod)
            .string("FireRateStackLayer", self.fire_rate_stack_layer.to_string())
            .number("EndDamageMod", self.end_damage_mod)
            .string("DamageStackLayer", self.damage_stack_layer.to_string())
            .number("AccelTime", self.accel_time)
            .number("DecelTime", self.decel_time)
            .number("DecelDelay", self.decel_delay);
        if self.continuous_growth {
            out.string("AccelExponent", "e");
        } else {
            out.number("AccelExponent", self.accel_exponent);
        }
    }

    fn clone_template(&self) -> Box<dyn WeaponProperty> {
        Box::new(Self {
            trigger: self.trigger.as_ref().map(TriggerCoordinator::clone_config),
            progress: 0.0,
            last_update: None,
            saved_progress: 0.0,
            saved_update: None,
            ..*self
        })
    }

    fn reset_state(&mut self) {
        self.progress = 0.0;
        self.last_update = None;
        self.saved_progress = 0.0;
        self.saved_update = None;
        if let Some(trigger) = self.trigger.as_mut() {
            trigger.clear_state();
        }
    }

    fn supports(&self, category: WeaponCategory) -> bool {
        category == WeaponCategory::Gun
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;
    use crate::context::{DamageQuery, StatQuery};
    use crate::damage::DamageType;
    use crate::property::test_support::Harness;

    fn fire_rate(module: &mut Accelerate, harness: &mut Harness) -> f32 {
        let mut context = Context::FireRate(StatQuery::new(harness.weapon.base_fire_rate));
        module.invoke(&mut context, &mut harness.cx());
        let Context::FireRate(query) = context else {
            unreachable!();
        };
        query.value()
    }

    fn shoot(module: &mut Accelerate, harness: &mut Harness) -> f32 {
        module.invoke(&mut Context::PreFire, &mut harness.cx());
        let rate = fire_rate(module, harness);
        harness.weapon.current_fire_rate = rate;
        rate
    }

    #[test]
    fn sustained_fire_reaches_end_modifier() {
        let mut harness = Harness::gun(10.0);
        let mut module = Accelerate::default()
            .with_end_fire_rate_mod(2.0)
            .with_ramp(1.0, 1.0, 0.0);
        module.on_trigger_reset(&mut harness.cx());

        assert_eq!(shoot(&mut module, &mut harness), 10.0);
        for _ in 0..20 {
            harness.clock.advance(0.1);
            shoot(&mut module, &mut harness);
        }
        assert_eq!(module.progress(), 1.0);
        assert_eq!(fire_rate(&mut module, &mut harness), 20.0);
    }

    #[test]
    fn pause_decays_progress() {
        let mut harness = Harness::gun(10.0);
        let mut module = Accelerate::default()
            .with_end_fire_rate_mod(2.0)
            .with_ramp(1.0, 2.0, 0.5);
        module.on_trigger_reset(&mut harness.cx());
        for _ in 0..20 {
            harness.clock.advance(0.1);
            shoot(&mut module, &mut harness);
        }
        let before = module.progress();
        assert!(before > 0.9);

        // 1.6 s idle: one shot interval and the frame are credited, 0.5 s is
        // grace, the rest decays at half the ramp per second.
        harness.clock.set(harness.clock.now() + 1.6);
        module.invoke(&mut Context::PreStartFire, &mut harness.cx());
        assert!(module.progress() < before);
        assert!((module.progress() - 0.5).abs() < 0.06);
    }

    #[test]
    fn cancel_restores_previous_progress() {
        let mut harness = Harness::gun(10.0);
        let mut module = Accelerate::default().with_end_fire_rate_mod(3.0);
        module.on_trigger_reset(&mut harness.cx());

        harness.clock.advance(0.1);
        shoot(&mut module, &mut harness);
        let kept = module.progress();

        harness.clock.advance(0.1);
        module.invoke(&mut Context::PreFire, &mut harness.cx());
        assert!(module.progress() > kept);
        module.invoke(&mut Context::FireCanceled, &mut harness.cx());
        assert_eq!(module.progress(), kept);
    }

    #[test]
    fn continuous_growth_uses_exponential_curve() {
        let mut harness = Harness::gun(10.0);
        let mut module = Accelerate::default()
            .with_end_damage_mod(4.0)
            .with_continuous_growth();
        module.progress = 0.5;

        let mut context = Context::Damage(DamageQuery::new(10.0, DamageType::BULLET));
        module.invoke(&mut context, &mut harness.cx());
        let Context::Damage(query) = context else {
            unreachable!();
        };
        assert!((query.damage() - 20.0).abs() < 1e-4);
    }

    #[test]
    fn trigger_apply_restarts_ramp() {
        let mut harness = Harness::gun(10.0);
        let mut module = Accelerate::default().with_end_fire_rate_mod(2.0);
        module.progress = 0.8;
        harness.clock.set(3.0);
        module.on_trigger_apply(&[], &mut harness.cx());
        assert_eq!(module.progress(), 0.0);
        assert_eq!(module.last_update, Some(3.0));
    }

    #[test]
    fn shot_delay_converts_to_rate() {
        let mut module = Accelerate::default();
        let delay = serde_json::json!(0.05);
        module.set_field("endshotdelay", &FieldValue::new(&delay));
        assert!((module.fire_rate_target(10.0) - 2.0).abs() < 1e-5);

        let zero = serde_json::json!(0);
        module.set_field("endshotdelay", &FieldValue::new(&zero));
        assert!((module.end_fire_rate - 1000.0).abs() < 0.01);
        assert!(!module.supports(WeaponCategory::Melee));
    }
}
