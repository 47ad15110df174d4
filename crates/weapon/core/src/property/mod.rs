//! Property module model.
//!
//! A property module is a configured, stateful unit of weapon behavior. It
//! declares the context kinds it handles through [`WeaponProperty::contexts`],
//! optionally owns a [`TriggerCoordinator`], and optionally participates in
//! networked sync through [`SyncProperty`].
//!
//! # Lifecycle
//!
//! ```text
//! decode → template ──clone_template──▶ instance ──register──▶ dispatch ...
//!                                                      │
//!                                   set_active(false/true) without re-registering
//!                                                      │
//!                                         clear → reset_state
//! ```
//!
//! Templates decoded from configuration are never registered; every weapon
//! receives its own clones. Modules never reference each other's state.

mod accelerate;
mod ammo_mod;
mod auto_trigger;
mod explosive;
mod stat_mod;

pub use accelerate::Accelerate;
pub use ammo_mod::{AmmoMod, AmmoRequest, AmmoResolution, ReceiverSlot};
pub use auto_trigger::AutoTrigger;
pub use explosive::{
    ExplosionOrigin, ExplosionRequest, ExplosionSettings, Explosive, STICKY_MINE_EXPLODE,
    sound_event_id,
};
pub use stat_mod::{StatMod, StatTarget};

use std::fmt;

use crate::clock::Clock;
use crate::codec::{DocumentWriter, FieldValue};
use crate::context::{Context, ContextSet};
use crate::trigger::{TriggerCoordinator, TriggerHit};

/// Host identity of a weapon instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WeaponCategory {
    Gun,
    Melee,
}

/// Read-only weapon facts modules may consult during dispatch.
#[derive(Clone, Debug, PartialEq)]
pub struct WeaponInfo {
    pub id: WeaponId,
    pub category: WeaponCategory,
    /// Shots per second before any module applies.
    pub base_fire_rate: f32,
    /// Shots per second after the last fire-rate refresh.
    pub current_fire_rate: f32,
    pub trigger_needs_press: bool,
}

impl WeaponInfo {
    pub fn new(id: WeaponId, category: WeaponCategory, base_fire_rate: f32) -> Self {
        Self {
            id,
            category,
            base_fire_rate,
            current_fire_rate: base_fire_rate,
            trigger_needs_press: false,
        }
    }

    #[must_use]
    pub fn with_trigger_needs_press(mut self, needs_press: bool) -> Self {
        self.trigger_needs_press = needs_press;
        self
    }
}

/// Side effect a module asks the host to perform.
#[derive(Clone, Debug, PartialEq)]
pub enum WeaponEffect {
    Ammo(AmmoRequest),
    Explosion(ExplosionRequest),
    /// Set the weapon's semi-automatic flag.
    TriggerNeedsPress(bool),
    /// Locally evaluated trigger value to broadcast to remote peers.
    SyncTrigger { sync_id: u16, value: f32 },
    /// Locally evaluated trigger reset to broadcast to remote peers.
    SyncReset { sync_id: u16 },
}

/// Per-dispatch environment handed to module callbacks.
pub struct DispatchCx<'a> {
    weapon: &'a WeaponInfo,
    now: f32,
    delta: f32,
    effects: &'a mut Vec<WeaponEffect>,
}

impl<'a> DispatchCx<'a> {
    pub fn new(weapon: &'a WeaponInfo, clock: &dyn Clock, effects: &'a mut Vec<WeaponEffect>) -> Self {
        Self {
            weapon,
            now: clock.now(),
            delta: clock.delta(),
            effects,
        }
    }

    pub fn weapon(&self) -> &WeaponInfo {
        self.weapon
    }

    /// Seconds on the monotonic clock at the start of this dispatch.
    pub fn now(&self) -> f32 {
        self.now
    }

    /// Duration of the current frame.
    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn emit(&mut self, effect: WeaponEffect) {
        self.effects.push(effect);
    }

    pub fn effects(&self) -> &[WeaponEffect] {
        self.effects
    }
}

/// A capability-declaring unit of weapon behavior.
///
/// Only [`kind`](Self::kind), [`contexts`](Self::contexts) and the codec and
/// cloning methods are mandatory; the rest default to "capability absent".
pub trait WeaponProperty: fmt::Debug + Send {
    /// Canonical kind name, as written in the `Name` field.
    fn kind(&self) -> &'static str;

    /// Context kinds delivered to [`invoke`](Self::invoke).
    fn contexts(&self) -> ContextSet;

    /// Handles a context from [`contexts`](Self::contexts). Called in
    /// registration order while the module is active.
    fn invoke(&mut self, _context: &mut Context, _cx: &mut DispatchCx<'_>) {}

    fn trigger(&self) -> Option<&TriggerCoordinator> {
        None
    }

    fn trigger_mut(&mut self) -> Option<&mut TriggerCoordinator> {
        None
    }

    /// Replaces the trigger configuration. Ignored by modules without one.
    fn set_trigger(&mut self, _trigger: TriggerCoordinator) {}

    /// Receives every hit collected during one dispatch pass.
    fn on_trigger_apply(&mut self, _hits: &[TriggerHit], _cx: &mut DispatchCx<'_>) {}

    /// Called once at registration and whenever a reset trigger fires.
    fn on_trigger_reset(&mut self, _cx: &mut DispatchCx<'_>) {}

    fn as_sync_mut(&mut self) -> Option<&mut dyn SyncProperty> {
        None
    }

    /// Applies one normalized configuration key; unknown keys are ignored.
    fn set_field(&mut self, key: &str, value: &FieldValue<'_>);

    /// Writes every configuration field except `Name` and `Trigger`.
    fn encode(&self, out: &mut DocumentWriter);

    /// Identical configuration, zero runtime state.
    fn clone_template(&self) -> Box<dyn WeaponProperty>;

    /// Clears transient runtime state; configuration is untouched.
    fn reset_state(&mut self);

    /// Whether the module can run on a weapon of `category`.
    fn supports(&self, _category: WeaponCategory) -> bool {
        true
    }
}

/// Trigger module whose evaluated values are mirrored to remote peers.
///
/// The authoritative peer evaluates triggers locally and emits
/// [`WeaponEffect::SyncTrigger`]; remote peers skip local evaluation and feed
/// the broadcast values back in through
/// [`apply_synced_value`](Self::apply_synced_value).
pub trait SyncProperty {
    fn sync_id(&self) -> u16;

    fn set_sync_id(&mut self, id: u16);

    fn apply_synced_value(&mut self, value: f32, cx: &mut DispatchCx<'_>);

    fn reset_synced(&mut self, cx: &mut DispatchCx<'_>);
}

/// Ordered collection of module templates (or registered clones).
#[derive(Debug, Default)]
pub struct PropertyList {
    properties: Vec<Box<dyn WeaponProperty>>,
}

impl PropertyList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, property: Box<dyn WeaponProperty>) {
        self.properties.push(property);
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Box<dyn WeaponProperty>> {
        self.properties.iter()
    }

    /// Fresh per-weapon instances, in list order.
    pub fn clone_templates(&self) -> Vec<Box<dyn WeaponProperty>> {
        self.properties.iter().map(|p| p.clone_template()).collect()
    }
}

impl Clone for PropertyList {
    fn clone(&self) -> Self {
        Self {
            properties: self.clone_templates(),
        }
    }
}

impl FromIterator<Box<dyn WeaponProperty>> for PropertyList {
    fn from_iter<I: IntoIterator<Item = Box<dyn WeaponProperty>>>(iter: I) -> Self {
        Self {
            properties: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for PropertyList {
    type Item = Box<dyn WeaponProperty>;
    type IntoIter = std::vec::IntoIter<Box<dyn WeaponProperty>>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.into_iter()
    }
}
