//! Per-weapon host component.
//!
//! [`CustomWeapon`] owns one weapon's dispatch registry and the fire-rate
//! bookkeeping hosts need around it: the folded fire rate, the burst delay
//! scaled to match, and the timers to restore when a shot is canceled.
//!
//! # Lifecycle
//!
//! ```text
//! new ── register ──► enabled ── owner_init ──► owner set
//!   ▲                    │                         │
//!   └────── clear ◄──────┴─────────────────────────┘
//! ```
//!
//! `update`, `enable` and `disable` only dispatch once the owner is set.

use tracing::{debug, trace, warn};
use weapon_content::CustomWeaponData;
use weapon_core::{
    Clock, Context, DamageQuery, DispatchCx, DispatchRegistry, EngineConfig, PropertyId,
    StatQuery, WeaponCategory, WeaponEffect, WeaponId, WeaponInfo,
};

use crate::error::{Result, RuntimeError};
use crate::sync::{SyncMessage, SyncPayload};

/// Host shot timers, in clock seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShotTimers {
    pub next_shot: f32,
    pub next_burst: f32,
}

#[derive(Debug)]
pub struct CustomWeapon {
    info: WeaponInfo,
    config: EngineConfig,
    registry: DispatchRegistry,
    effects: Vec<WeaponEffect>,

    archetype: Option<u32>,
    parked_archetype: Option<u32>,

    enabled: bool,
    synced: bool,
    owner_set: bool,
    cancel_shot: bool,

    burst_delay: f32,
    current_burst_delay: f32,
    last_fire_rate: f32,
    last_timers: ShotTimers,
}

impl CustomWeapon {
    /// A gun whose archetype fires every `shot_delay` seconds.
    pub fn gun(id: WeaponId, shot_delay: f32, burst_delay: f32, config: EngineConfig) -> Self {
        let base = config.fire_rate_from_delay(shot_delay);
        Self::new(WeaponInfo::new(id, WeaponCategory::Gun, base), burst_delay, config)
    }

    /// A melee weapon; it has no fire rate of its own.
    pub fn melee(id: WeaponId, config: EngineConfig) -> Self {
        Self::new(WeaponInfo::new(id, WeaponCategory::Melee, 0.0), 0.0, config)
    }

    fn new(info: WeaponInfo, burst_delay: f32, config: EngineConfig) -> Self {
        Self {
            last_fire_rate: info.base_fire_rate,
            info,
            config,
            registry: DispatchRegistry::new(),
            effects: Vec::new(),
            archetype: None,
            parked_archetype: None,
            enabled: false,
            synced: false,
            owner_set: false,
            cancel_shot: false,
            burst_delay,
            current_burst_delay: burst_delay,
            last_timers: ShotTimers::default(),
        }
    }

    #[must_use]
    pub fn with_trigger_needs_press(mut self, needs_press: bool) -> Self {
        self.info.trigger_needs_press = needs_press;
        self
    }

    // ===== lifecycle =====

    /// Registers fresh copies of `data`'s templates and dispatches `Setup`.
    ///
    /// Returns `false` without effect when already registered. Templates that
    /// do not support this weapon's category are skipped. Re-registering the
    /// archetype that was last cleared reuses its parked modules.
    pub fn register(&mut self, data: &CustomWeaponData, clock: &dyn Clock) -> bool {
        if self.enabled {
            return false;
        }
        self.enabled = true;
        self.archetype = Some(data.archetype_id);

        let mut cx = DispatchCx::new(&self.info, clock, &mut self.effects);
        if self.parked_archetype.take() == Some(data.archetype_id) {
            let restored = self.registry.restore(&mut cx);
            trace!(
                target: "runtime::weapon",
                weapon = ?self.info.id,
                restored,
                "reused parked properties"
            );
        } else {
            self.registry.discard_parked();
            register_templates(&mut self.registry, data, &mut cx);
        }

        debug!(
            target: "runtime::weapon",
            weapon = ?self.info.id,
            archetype = data.archetype_id,
            properties = self.registry.len(),
            remote = self.synced,
            "registered custom weapon"
        );

        self.invoke(&mut Context::Setup, clock);
        true
    }

    /// Re-registers `data` as a remote mirror of another peer's weapon.
    pub fn set_to_sync(&mut self, data: &CustomWeaponData, clock: &dyn Clock) {
        if self.synced {
            return;
        }
        self.clear(clock);
        self.registry.set_remote(true);
        self.synced = true;
        self.register(data, clock);
    }

    /// Dispatches `OwnerSet` once per registration.
    pub fn owner_init(&mut self, clock: &dyn Clock) {
        if !self.enabled || self.owner_set {
            return;
        }
        self.owner_set = true;
        self.invoke(&mut Context::OwnerSet, clock);
    }

    pub fn update(&mut self, clock: &dyn Clock) {
        if self.owner_set {
            self.invoke(&mut Context::Update, clock);
        }
    }

    pub fn enable(&mut self, clock: &dyn Clock) {
        if self.owner_set {
            self.invoke(&mut Context::Enable, clock);
        }
    }

    pub fn disable(&mut self, clock: &dyn Clock) {
        if self.owner_set {
            self.invoke(&mut Context::Disable, clock);
        }
    }

    /// Dispatches `Clear`, parks every module and restores base rates.
    pub fn clear(&mut self, clock: &dyn Clock) {
        self.invoke(&mut Context::Clear, clock);
        self.registry.clear();
        self.parked_archetype = self.archetype.take();
        self.owner_set = false;
        self.enabled = false;
        self.cancel_shot = false;
        self.info.current_fire_rate = self.info.base_fire_rate;
        self.last_fire_rate = self.info.base_fire_rate;
        self.current_burst_delay = self.burst_delay;
    }

    pub fn set_active(&mut self, id: PropertyId, active: bool) -> bool {
        self.registry.set_active(id, active)
    }

    // ===== dispatch =====

    pub fn invoke(&mut self, context: &mut Context, clock: &dyn Clock) {
        self.invoke_pass(std::slice::from_mut(context), clock);
    }

    /// Dispatches several contexts as one trigger pass.
    pub fn invoke_pass(&mut self, contexts: &mut [Context], clock: &dyn Clock) {
        let start = self.effects.len();
        let mut cx = DispatchCx::new(&self.info, clock, &mut self.effects);
        self.registry.invoke_pass(contexts, &mut cx);
        self.mirror_effects(start);
    }

    fn mirror_effects(&mut self, start: usize) {
        for effect in &self.effects[start..] {
            if let WeaponEffect::TriggerNeedsPress(needs_press) = effect {
                self.info.trigger_needs_press = *needs_press;
            }
        }
    }

    /// Takes every effect emitted since the last drain.
    pub fn drain_effects(&mut self) -> Vec<WeaponEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Drains effects, returning the sync messages among them and keeping
    /// the rest for the host.
    pub fn drain_sync_messages(&mut self) -> Vec<SyncMessage> {
        let id = self.info.id;
        let mut messages = Vec::new();
        self.effects.retain(|effect| match SyncMessage::from_effect(id, effect) {
            Some(message) => {
                messages.push(message);
                false
            }
            None => true,
        });
        messages
    }

    // ===== queries =====

    /// Current folded fire rate, as of the last refresh.
    pub fn fire_rate(&self) -> f32 {
        self.info.current_fire_rate
    }

    pub fn base_fire_rate(&self) -> f32 {
        self.info.base_fire_rate
    }

    /// Burst delay scaled by the current fire rate.
    pub fn burst_delay(&self) -> f32 {
        self.current_burst_delay
    }

    /// Folds `damage` through every damage subscriber.
    pub fn damage(&mut self, query: DamageQuery, clock: &dyn Clock) -> DamageQuery {
        let mut context = Context::Damage(query);
        self.invoke(&mut context, clock);
        match context {
            Context::Damage(query) => query,
            _ => unreachable!("dispatch never changes a context's kind"),
        }
    }

    pub fn recoil(&mut self, base: f32, clock: &dyn Clock) -> f32 {
        let mut context = Context::Recoil(StatQuery::new(base));
        self.invoke(&mut context, clock);
        match context {
            Context::Recoil(query) => query.value(),
            _ => unreachable!("dispatch never changes a context's kind"),
        }
    }

    fn query_fire_rate(&mut self, clock: &dyn Clock) -> f32 {
        let mut context = Context::FireRate(StatQuery::new(self.info.base_fire_rate));
        self.invoke(&mut context, clock);
        match context {
            Context::FireRate(query) => query.value(),
            _ => unreachable!("dispatch never changes a context's kind"),
        }
    }

    // ===== fire rate =====

    /// Stores the pre-shot state for cancellation, then refreshes the rate.
    ///
    /// The folded rate is clamped to the engine limits and the burst delay
    /// scales inversely with it.
    pub fn update_stored_fire_rate(&mut self, timers: ShotTimers, clock: &dyn Clock) {
        self.last_fire_rate = self.info.current_fire_rate;
        self.last_timers = timers;

        let queried = self.query_fire_rate(clock);
        let current = self.config.clamp_fire_rate(queried);
        if current != self.info.current_fire_rate {
            self.info.current_fire_rate = current;
            self.current_burst_delay = self.burst_delay * self.info.base_fire_rate / current;
            trace!(
                target: "runtime::weapon",
                weapon = ?self.info.id,
                rate = current,
                "fire rate refreshed"
            );
        }
    }

    /// Re-reads archetype timing after the host changed it.
    pub fn refresh_archetype(
        &mut self,
        shot_delay: f32,
        burst_delay: f32,
        timers: ShotTimers,
        clock: &dyn Clock,
    ) {
        if self.info.category != WeaponCategory::Gun {
            return;
        }
        self.info.base_fire_rate = self.config.fire_rate_from_delay(shot_delay);
        self.burst_delay = burst_delay;
        self.update_stored_fire_rate(timers, clock);
    }

    /// Timers for the next shot at the current rate.
    pub fn next_shot_timers(&self, now: f32, current: ShotTimers, burst_done: bool) -> ShotTimers {
        let next_shot = now + 1.0 / self.info.current_fire_rate;
        let next_burst = if burst_done {
            (now + self.current_burst_delay).max(next_shot)
        } else {
            current.next_burst
        };
        ShotTimers {
            next_shot,
            next_burst,
        }
    }

    /// Last-fire timestamp that makes a remote copy honour the current rate.
    pub fn synced_last_fire_time(&self, now: f32, archetype_shot_delay: f32) -> f32 {
        now + 1.0 / self.info.current_fire_rate - archetype_shot_delay
    }

    // ===== cancellation =====

    pub fn cancel_shot(&self) -> bool {
        self.cancel_shot
    }

    /// Marks the in-flight shot canceled, dispatching `FireCanceled` once.
    pub fn store_cancel_shot(&mut self, clock: &dyn Clock) {
        if !self.cancel_shot {
            self.invoke(&mut Context::FireCanceled, clock);
            self.cancel_shot = true;
        }
    }

    /// Restores the state saved before a canceled shot.
    ///
    /// Returns the timers the host should restore, or `None` when no shot was
    /// canceled. The cancel flag stays set until [`clear_cancel_shot`](Self::clear_cancel_shot).
    pub fn reset_shot_if_cancel(&mut self) -> Option<ShotTimers> {
        if !self.cancel_shot {
            return None;
        }
        self.info.current_fire_rate = self.last_fire_rate;
        self.current_burst_delay =
            self.burst_delay * self.info.base_fire_rate / self.last_fire_rate.max(EngineConfig::MIN_FIRE_RATE);
        Some(self.last_timers)
    }

    pub fn clear_cancel_shot(&mut self) {
        self.cancel_shot = false;
    }

    // ===== sync =====

    pub fn apply_sync(&mut self, message: &SyncMessage, clock: &dyn Clock) -> Result<()> {
        match message.payload {
            SyncPayload::Trigger { value } => self.apply_synced_value(message.sync_id, value, clock),
            SyncPayload::Reset => self.reset_synced(message.sync_id, clock),
        }
    }

    pub fn apply_synced_value(
        &mut self,
        sync_id: u16,
        value: f32,
        clock: &dyn Clock,
    ) -> Result<()> {
        let start = self.effects.len();
        let mut cx = DispatchCx::new(&self.info, clock, &mut self.effects);
        let applied = self.registry.apply_synced_value(sync_id, value, &mut cx);
        self.mirror_effects(start);
        self.sync_result(applied, sync_id)
    }

    pub fn reset_synced(&mut self, sync_id: u16, clock: &dyn Clock) -> Result<()> {
        let start = self.effects.len();
        let mut cx = DispatchCx::new(&self.info, clock, &mut self.effects);
        let applied = self.registry.reset_synced(sync_id, &mut cx);
        self.mirror_effects(start);
        self.sync_result(applied, sync_id)
    }

    fn sync_result(&self, applied: bool, sync_id: u16) -> Result<()> {
        if applied {
            trace!(target: "runtime::sync", weapon = ?self.info.id, sync_id, "applied sync");
            Ok(())
        } else {
            Err(RuntimeError::UnknownSyncId {
                weapon: self.info.id,
                sync_id,
            })
        }
    }

    // ===== accessors =====

    pub fn id(&self) -> WeaponId {
        self.info.id
    }

    pub fn info(&self) -> &WeaponInfo {
        &self.info
    }

    pub fn registry(&self) -> &DispatchRegistry {
        &self.registry
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }

    pub fn is_owner_set(&self) -> bool {
        self.owner_set
    }
}

fn register_templates(
    registry: &mut DispatchRegistry,
    data: &CustomWeaponData,
    cx: &mut DispatchCx<'_>,
) {
    let weapon = cx.weapon().id;
    let category = cx.weapon().category;
    for property in data.instantiate() {
        if !property.supports(category) {
            debug!(
                target: "runtime::weapon",
                ?weapon,
                kind = property.kind(),
                %category,
                "skipping unsupported property"
            );
            continue;
        }
        let kind = property.kind();
        if let Err(error) = registry.register(property, cx) {
            warn!(target: "runtime::weapon", ?weapon, kind, %error, "property rejected");
        }
    }
}
