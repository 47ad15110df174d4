use crate::codec::{DocumentWriter, FieldValue, normalize_key};
use crate::context::{Context, ContextSet};
use crate::property::{DispatchCx, WeaponCategory, WeaponEffect, WeaponProperty};
use crate::trigger::{TriggerCoordinator, TriggerHit};

/// Inventory slot whose weapon receives an ammo change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReceiverSlot {
    /// The weapon that owns the module.
    #[default]
    None,
    Main,
    Special,
    Tool,
}

impl ReceiverSlot {
    pub fn parse(text: &str) -> Self {
        match normalize_key(text).as_str() {
            "main" | "primary" => Self::Main,
            "special" | "secondary" => Self::Special,
            "tool" | "class" => Self::Tool,
            _ => Self::None,
        }
    }
}

/// Whole-round ammo change the host should apply to a weapon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmmoRequest {
    pub clip: i32,
    pub reserve: i32,
    pub overflow_to_reserve: bool,
    pub pull_from_reserve: bool,
    /// The triggering shot has not decremented the clip yet.
    pub account_for_shot: bool,
    pub slot: ReceiverSlot,
}

/// Result of applying an [`AmmoRequest`] to concrete ammo counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AmmoResolution {
    pub new_clip: i32,
    pub reserve_delta: i32,
}

impl AmmoRequest {
    /// Applies the request against the receiving weapon's counts.
    ///
    /// The clip is clamped to `[0, max_clip]`, shifted up by one while the
    /// triggering shot is still pending. Overflow spills into reserves when
    /// enabled; with `pull_from_reserve`, clip gains are paid for by reserves.
    pub fn resolve(&self, current_clip: i32, max_clip: i32, reserve_available: i32) -> AmmoResolution {
        let pending = i32::from(self.account_for_shot);
        let requested = if self.pull_from_reserve {
            self.clip.min(reserve_available.max(0))
        } else {
            self.clip
        };

        let new_clip = (current_clip + requested).clamp(pending, max_clip.max(0) + pending);
        let applied = new_clip - current_clip;
        let overflow = if self.overflow_to_reserve {
            requested - applied
        } else {
            0
        };

        let reserve_delta = if self.pull_from_reserve {
            self.reserve - applied
        } else {
            self.reserve + overflow
        };

        AmmoResolution {
            new_clip,
            reserve_delta,
        }
    }
}

/// Converts trigger weight into clip and reserve ammo.
///
/// Fractional changes accumulate in buffers; a request is emitted once either
/// buffer holds at least one whole round, and the whole part is consumed.
#[derive(Debug)]
pub struct AmmoMod {
    clip_change: f32,
    reserve_change: f32,
    overflow_to_reserve: bool,
    pull_from_reserve: bool,
    receiver_slot: ReceiverSlot,
    trigger: Option<TriggerCoordinator>,

    clip_buffer: f32,
    reserve_buffer: f32,
    last_fire: Option<f32>,
}

impl Default for AmmoMod {
    fn default() -> Self {
        Self {
            clip_change: 0.0,
            reserve_change: 0.0,
            overflow_to_reserve: true,
            pull_from_reserve: false,
            receiver_slot: ReceiverSlot::None,
            trigger: None,
            clip_buffer: 0.0,
            reserve_buffer: 0.0,
            last_fire: None,
        }
    }
}

impl AmmoMod {
    pub fn new(clip_change: f32, reserve_change: f32) -> Self {
        Self {
            clip_change,
            reserve_change,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_trigger(mut self, trigger: TriggerCoordinator) -> Self {
        self.trigger = Some(trigger);
        self
    }

    #[must_use]
    pub fn pulling_from_reserve(mut self) -> Self {
        self.pull_from_reserve = true;
        self
    }

    /// Buffered fractional `(clip, reserve)` rounds.
    pub fn buffers(&self) -> (f32, f32) {
        (self.clip_buffer, self.reserve_buffer)
    }
}

impl WeaponProperty for AmmoMod {
    fn kind(&self) -> &'static str {
        "AmmoMod"
    }

    fn contexts(&self) -> ContextSet {
        ContextSet::PRE_FIRE
    }

    fn invoke(&mut self, context: &mut Context, cx: &mut DispatchCx<'_>) {
        if let Context::PreFire = context {
            self.last_fire = Some(cx.now());
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
        let weight: f32 = hits.iter().map(|hit| hit.amount).sum();
        self.clip_buffer += self.clip_change * weight;
        self.reserve_buffer += self.reserve_change * weight;

        if self.clip_buffer.abs() < 1.0 && self.reserve_buffer.abs() < 1.0 {
            return;
        }

        let clip = self.clip_buffer.trunc();
        let reserve = self.reserve_buffer.trunc();
        self.clip_buffer -= clip;
        self.reserve_buffer -= reserve;

        cx.emit(WeaponEffect::Ammo(AmmoRequest {
            clip: clip as i32,
            reserve: reserve as i32,
            overflow_to_reserve: self.overflow_to_reserve,
            pull_from_reserve: self.pull_from_reserve,
            account_for_shot: self.last_fire == Some(cx.now()),
            slot: self.receiver_slot,
        }));
    }

    fn on_trigger_reset(&mut self, _cx: &mut DispatchCx<'_>) {
        self.clip_buffer = 0.0;
        self.reserve_buffer = 0.0;
    }

    fn set_field(&mut self, key: &str, value: &FieldValue<'_>) {
        match key {
            "clipchange" | "clip" => {
                if let Some(change) = value.as_f32() {
                    self.clip_change = change;
                }
            }
            "reservechange" | "reserve" => {
                if let Some(change) = value.as_f32() {
                    self.reserve_change = change;
                }
            }
            "overflowtoreserve" | "overflow" => {
                if let Some(flag) = value.as_bool() {
                    self.overflow_to_reserve = flag;
                }
            }
            "pullfromreserve" => {
                if let Some(flag) = value.as_bool() {
                    self.pull_from_reserve = flag;
                }
            }
            "receiverslot" | "slot" => {
                if let Some(slot) = value.as_str() {
                    self.receiver_slot = ReceiverSlot::parse(slot);
                }
            }
            _ => {}
        }
    }

    fn encode(&self, out: &mut DocumentWriter) {
        out.number("ClipChange", self.clip_change)
            .number("ReserveChange", self.reserve_change)
            .boolean("OverflowToReserve", self.overflow_to_reserve)
            .boolean("PullFromReserve", self.pull_from_reserve)
            .string("ReceiverSlot", self.receiver_slot.to_string());
    }

    fn clone_template(&self) -> Box<dyn WeaponProperty> {
        Box::new(Self {
            trigger: self.trigger.as_ref().map(TriggerCoordinator::clone_config),
            clip_buffer: 0.0,
            reserve_buffer: 0.0,
            last_fire: None,
            ..*self
        })
    }

    fn reset_state(&mut self) {
        self.clip_buffer = 0.0;
        self.reserve_buffer = 0.0;
        self.last_fire = None;
        if let Some(trigger) = self.trigger.as_mut() {
            trigger.clear_state();
        }
    }

    fn supports(&self, category: WeaponCategory) -> bool {
        category == WeaponCategory::Gun
    }
}
