//! Per-weapon dispatch registry.
//!
//! The registry owns a weapon's registered modules and routes contexts to
//! them. Per-kind subscriber tables are built once at registration, so a
//! dispatch only visits modules that declared the context kind.
//!
//! # Dispatch pass
//!
//! ```text
//! for each context in the pass:
//!     invoke every active subscriber of the kind, in registration order
//!     trigger-bearing → every active coordinator collects weights
//!     Update          → coordinators past their reset delay reset
//! then, per trigger module in registration order:
//!     reset trigger fired → on_trigger_reset
//!     hits collected      → on_trigger_apply (once, with every hit)
//! ```
//!
//! In remote mode sync participants skip local trigger evaluation; their
//! state arrives through [`DispatchRegistry::apply_synced_value`].
//!
//! [`DispatchRegistry::clear`] parks the cleared modules instead of dropping
//! them, and [`DispatchRegistry::restore`] registers them again in the same
//! order when the weapon is re-equipped.

use crate::context::{Context, ContextKind};
use crate::error::RegistryError;
use crate::property::{DispatchCx, SyncProperty, WeaponEffect, WeaponProperty};

/// Sync participants one registry can address.
pub const MAX_SYNC_IDS: usize = u16::MAX as usize + 1;

/// Handle to a registered module, stable until [`DispatchRegistry::clear`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId(pub usize);

#[derive(Debug)]
struct Slot {
    property: Box<dyn WeaponProperty>,
    active: bool,
    sync_id: Option<u16>,
}

#[derive(Debug)]
pub struct DispatchRegistry {
    slots: Vec<Slot>,
    by_kind: [Vec<usize>; ContextKind::COUNT],
    triggered: Vec<usize>,
    synced: Vec<usize>,
    parked: Vec<Box<dyn WeaponProperty>>,
    remote: bool,
}

impl Default for DispatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchRegistry {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            by_kind: std::array::from_fn(|_| Vec::new()),
            triggered: Vec::new(),
            synced: Vec::new(),
            parked: Vec::new(),
            remote: false,
        }
    }

    /// Appends a module, indexes its capabilities and runs its initial reset.
    ///
    /// Sync ids are assigned in registration order among sync participants,
    /// so peers registering the same list agree on them. A sync participant
    /// past [`MAX_SYNC_IDS`] is rejected.
    pub fn register(
        &mut self,
        mut property: Box<dyn WeaponProperty>,
        cx: &mut DispatchCx<'_>,
    ) -> Result<PropertyId, RegistryError> {
        let index = self.slots.len();

        let sync_id = match property.as_sync_mut() {
            Some(sync) => {
                let id = u16::try_from(self.synced.len()).map_err(|_| {
                    RegistryError::SyncIdsExhausted {
                        limit: MAX_SYNC_IDS,
                    }
                })?;
                sync.set_sync_id(id);
                self.synced.push(index);
                Some(id)
            }
            None => None,
        };

        for kind in property.contexts().kinds() {
            self.by_kind[kind.index()].push(index);
        }
        if property.trigger().is_some() {
            self.triggered.push(index);
        }

        property.on_trigger_reset(cx);
        self.slots.push(Slot {
            property,
            active: true,
            sync_id,
        });
        Ok(PropertyId(index))
    }

    /// Dispatches a single context.
    pub fn invoke(&mut self, context: &mut Context, cx: &mut DispatchCx<'_>) {
        self.invoke_pass(std::slice::from_mut(context), cx);
    }

    /// Dispatches several contexts as one pass; each trigger module receives
    /// at most one `on_trigger_apply` for the whole pass.
    pub fn invoke_pass(&mut self, contexts: &mut [Context], cx: &mut DispatchCx<'_>) {
        let remote = self.remote;
        let Self {
            slots,
            by_kind,
            triggered,
            ..
        } = self;

        for context in contexts.iter_mut() {
            let kind = context.kind();
            for &index in &by_kind[kind.index()] {
                let slot = &mut slots[index];
                if slot.active {
                    slot.property.invoke(context, cx);
                }
            }

            let bears_trigger = kind.trigger_name().is_some();
            let is_update = kind == ContextKind::Update;
            if !bears_trigger && !is_update {
                continue;
            }

            for &index in triggered.iter() {
                let slot = &mut slots[index];
                if !slot.active || (remote && slot.sync_id.is_some()) {
                    continue;
                }
                let Some(trigger) = slot.property.trigger_mut() else {
                    continue;
                };

                if bears_trigger {
                    trigger.collect(context);
                } else if trigger.reset_due(cx.now()) {
                    reset_slot(slot, cx);
                }
            }
        }

        for &index in triggered.iter() {
            let slot = &mut slots[index];
            let Some(trigger) = slot.property.trigger_mut() else {
                continue;
            };
            let fired_reset = trigger.take_reset();
            let hits = trigger.take_pass(cx.now());

            if fired_reset {
                reset_slot(slot, cx);
            }
            if !hits.is_empty() {
                slot.property.on_trigger_apply(&hits, cx);
            }
        }
    }

    /// Toggles a module without changing registration order or membership.
    pub fn set_active(&mut self, id: PropertyId, active: bool) -> bool {
        match self.slots.get_mut(id.0) {
            Some(slot) => {
                slot.active = active;
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self, id: PropertyId) -> bool {
        self.slots.get(id.0).is_some_and(|slot| slot.active)
    }

    /// Switches between local evaluation and mirroring a remote peer.
    pub fn set_remote(&mut self, remote: bool) {
        self.remote = remote;
    }

    pub fn is_remote(&self) -> bool {
        self.remote
    }

    /// Feeds a broadcast trigger value into the module with `sync_id`.
    pub fn apply_synced_value(
        &mut self,
        sync_id: u16,
        value: f32,
        cx: &mut DispatchCx<'_>,
    ) -> bool {
        self.with_sync(sync_id, |sync, cx| sync.apply_synced_value(value, cx), cx)
    }

    /// Feeds a broadcast trigger reset into the module with `sync_id`.
    pub fn reset_synced(&mut self, sync_id: u16, cx: &mut DispatchCx<'_>) -> bool {
        self.with_sync(sync_id, |sync, cx| sync.reset_synced(cx), cx)
    }

    fn with_sync(
        &mut self,
        sync_id: u16,
        apply: impl FnOnce(&mut dyn SyncProperty, &mut DispatchCx<'_>),
        cx: &mut DispatchCx<'_>,
    ) -> bool {
        let Some(&index) = self.synced.get(usize::from(sync_id)) else {
            return false;
        };
        match self.slots[index].property.as_sync_mut() {
            Some(sync) => {
                apply(sync, cx);
                true
            }
            None => false,
        }
    }

    /// Resets every module's transient state and empties the dispatch lists.
    ///
    /// The modules themselves are parked for [`restore`](Self::restore);
    /// modules parked by an earlier clear are dropped.
    pub fn clear(&mut self) {
        self.parked.clear();
        self.parked.extend(self.slots.drain(..).map(|mut slot| {
            slot.property.reset_state();
            slot.property
        }));
        self.by_kind.iter_mut().for_each(Vec::clear);
        self.triggered.clear();
        self.synced.clear();
    }

    /// Registers the modules parked by the last [`clear`](Self::clear) in
    /// their original order. Returns how many came back.
    pub fn restore(&mut self, cx: &mut DispatchCx<'_>) -> usize {
        let parked = std::mem::take(&mut self.parked);
        let mut restored = 0;
        for property in parked {
            if self.register(property, cx).is_ok() {
                restored += 1;
            }
        }
        restored
    }

    /// Drops the parked modules.
    pub fn discard_parked(&mut self) {
        self.parked.clear();
    }

    pub fn parked_len(&self) -> usize {
        self.parked.len()
    }

    pub fn get(&self, id: PropertyId) -> Option<&dyn WeaponProperty> {
        self.slots.get(id.0).map(|slot| slot.property.as_ref())
    }

    pub fn get_mut(&mut self, id: PropertyId) -> Option<&mut dyn WeaponProperty> {
        match self.slots.get_mut(id.0) {
            Some(slot) => Some(slot.property.as_mut()),
            None => None,
        }
    }

    /// Registered modules in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &dyn WeaponProperty)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| (PropertyId(index), slot.property.as_ref()))
    }

    /// Subscribers of `kind` in dispatch order, active or not.
    pub fn subscribers(&self, kind: ContextKind) -> impl Iterator<Item = PropertyId> + '_ {
        self.by_kind[kind.index()].iter().map(|&index| PropertyId(index))
    }

    /// `(sync id, module)` pairs in sync id order.
    pub fn sync_ids(&self) -> impl Iterator<Item = (u16, PropertyId)> + '_ {
        self.synced
            .iter()
            .enumerate()
            .map(|(id, &index)| (id as u16, PropertyId(index)))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

fn reset_slot(slot: &mut Slot, cx: &mut DispatchCx<'_>) {
    slot.property.on_trigger_reset(cx);
    if let Some(sync_id) = slot.sync_id {
        cx.emit(WeaponEffect::SyncReset { sync_id });
    }
}
