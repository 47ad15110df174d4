//! Last-hit attribution for kills.
//!
//! Hosts learn about deaths separately from the hit that caused them, so the
//! tracker remembers the most recent locally owned hit on each target. A kill
//! is attributed at most once per tracked hit.
//!
//! The tracker is owned by [`WeaponManager`](crate::WeaponManager) and reset
//! on level teardown.

use std::collections::HashMap;

use weapon_core::{DamageableHitContext, KillContext, TargetId, WeaponId};

#[derive(Debug, Clone)]
struct TrackedHit {
    weapon: WeaponId,
    hit: DamageableHitContext,
    shown: bool,
}

#[derive(Debug, Default)]
pub struct KillTracker {
    last_hits: HashMap<TargetId, TrackedHit>,
}

impl KillTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `hit` as the latest hit on its target.
    ///
    /// Remote-owned hits are ignored. A new hit on an already tracked target
    /// replaces the stored hit but keeps whether its kill was reported.
    pub fn register_hit(
        &mut self,
        weapon: WeaponId,
        hit: &DamageableHitContext,
        locally_owned: bool,
    ) {
        if !locally_owned {
            return;
        }

        self.last_hits
            .entry(hit.target())
            .and_modify(|tracked| {
                tracked.weapon = weapon;
                tracked.hit = hit.clone();
            })
            .or_insert_with(|| TrackedHit {
                weapon,
                hit: hit.clone(),
                shown: false,
            });
    }

    /// Forgets a target, typically when it despawns.
    pub fn clear_hit(&mut self, target: TargetId) {
        self.last_hits.remove(&target);
    }

    /// Attributes a kill on `target`, once.
    ///
    /// Entries whose weapon fails `weapon_alive` are pruned first.
    pub fn take_kill(
        &mut self,
        target: TargetId,
        weapon_alive: impl Fn(WeaponId) -> bool,
    ) -> Option<(WeaponId, KillContext)> {
        self.last_hits.retain(|_, tracked| weapon_alive(tracked.weapon));

        let tracked = self.last_hits.get_mut(&target)?;
        if tracked.shown {
            return None;
        }
        tracked.shown = true;
        Some((tracked.weapon, KillContext::from_hit(&tracked.hit)))
    }

    pub fn len(&self) -> usize {
        self.last_hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_hits.is_empty()
    }

    /// Drops every tracked hit.
    pub fn reset(&mut self) {
        self.last_hits.clear();
    }
}
