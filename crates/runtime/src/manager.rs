//! Registry of live custom weapons and the services they share.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};
use weapon_content::{ContentFactory, WeaponCatalog};
use weapon_core::{
    Clock, Context, DamageableHitContext, EngineConfig, TargetId, WeaponCategory, WeaponId,
};

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::kill_tracker::KillTracker;
use crate::sync::SyncMessage;
use crate::weapon::CustomWeapon;

/// Owns the weapon catalog, every live [`CustomWeapon`] and the kill tracker.
#[derive(Debug, Default)]
pub struct WeaponManager {
    catalog: WeaponCatalog,
    config: EngineConfig,
    weapons: BTreeMap<WeaponId, CustomWeapon>,
    kills: KillTracker,
}

impl WeaponManager {
    pub fn new(catalog: WeaponCatalog, config: EngineConfig) -> Self {
        Self {
            catalog,
            config,
            weapons: BTreeMap::new(),
            kills: KillTracker::new(),
        }
    }

    /// Loads the catalog and engine tuning from `config.data_dir`.
    ///
    /// `config.toml` in the data directory is optional; environment overrides
    /// already folded into `config.engine` take precedence over it.
    pub fn load(config: &RuntimeConfig) -> Result<Self> {
        let factory = ContentFactory::new(&config.data_dir);
        let content_error =
            |source: Box<dyn std::error::Error + Send + Sync>| RuntimeError::Content {
                path: config.data_dir.clone(),
                source,
            };

        let mut engine = factory
            .load_config_or_default()
            .map_err(|e| content_error(e.into()))?;
        let defaults = EngineConfig::default();
        if config.engine.max_fire_rate != defaults.max_fire_rate {
            engine.max_fire_rate = config.engine.max_fire_rate;
        }
        if config.engine.min_shot_delay != defaults.min_shot_delay {
            engine.min_shot_delay = config.engine.min_shot_delay;
        }

        let catalog = factory.load_weapons().map_err(|e| content_error(e.into()))?;
        info!(
            target: "runtime::manager",
            data_dir = %config.data_dir.display(),
            weapons = catalog.len(),
            "weapon content loaded"
        );
        Ok(Self::new(catalog, engine))
    }

    /// Creates and registers a gun for `archetype_id`.
    ///
    /// Archetypes without custom data are not tracked and report
    /// [`RuntimeError::MissingData`].
    pub fn spawn_gun(
        &mut self,
        id: WeaponId,
        archetype_id: u32,
        shot_delay: f32,
        burst_delay: f32,
        clock: &dyn Clock,
    ) -> Result<&mut CustomWeapon> {
        let weapon = CustomWeapon::gun(id, shot_delay, burst_delay, self.config.clone());
        self.spawn(weapon, archetype_id, clock)
    }

    pub fn spawn_melee(
        &mut self,
        id: WeaponId,
        archetype_id: u32,
        clock: &dyn Clock,
    ) -> Result<&mut CustomWeapon> {
        let weapon = CustomWeapon::melee(id, self.config.clone());
        self.spawn(weapon, archetype_id, clock)
    }

    fn spawn(
        &mut self,
        mut weapon: CustomWeapon,
        archetype_id: u32,
        clock: &dyn Clock,
    ) -> Result<&mut CustomWeapon> {
        let category = weapon.info().category;
        let data = self
            .catalog
            .get(category, archetype_id)
            .ok_or(RuntimeError::MissingData {
                category,
                archetype_id,
            })?;

        weapon.register(data, clock);
        let id = weapon.id();
        if let Some(mut previous) = self.weapons.insert(id, weapon) {
            warn!(target: "runtime::manager", weapon = ?id, "replacing live weapon");
            previous.clear(clock);
        }
        self.weapons.get_mut(&id).ok_or(RuntimeError::UnknownWeapon(id))
    }

    /// Switches a live weapon to mirror a remote peer.
    pub fn set_to_sync(
        &mut self,
        id: WeaponId,
        archetype_id: u32,
        clock: &dyn Clock,
    ) -> Result<()> {
        let weapon = self.weapons.get_mut(&id).ok_or(RuntimeError::UnknownWeapon(id))?;
        let category = weapon.info().category;
        let data = self
            .catalog
            .get(category, archetype_id)
            .ok_or(RuntimeError::MissingData {
                category,
                archetype_id,
            })?;
        weapon.set_to_sync(data, clock);
        Ok(())
    }

    /// Clears and forgets a weapon.
    pub fn remove(&mut self, id: WeaponId, clock: &dyn Clock) -> Option<CustomWeapon> {
        let mut weapon = self.weapons.remove(&id)?;
        weapon.clear(clock);
        Some(weapon)
    }

    pub fn get(&self, id: WeaponId) -> Option<&CustomWeapon> {
        self.weapons.get(&id)
    }

    pub fn get_mut(&mut self, id: WeaponId) -> Option<&mut CustomWeapon> {
        self.weapons.get_mut(&id)
    }

    pub fn catalog(&self) -> &WeaponCatalog {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }

    /// Ticks every live weapon.
    pub fn update(&mut self, clock: &dyn Clock) {
        for weapon in self.weapons.values_mut() {
            weapon.update(clock);
        }
    }

    // ===== hits & kills =====

    /// Dispatches `PreHitDamageable` and remembers the hit for kill attribution.
    pub fn on_pre_hit_damageable(
        &mut self,
        id: WeaponId,
        hit: DamageableHitContext,
        locally_owned: bool,
        clock: &dyn Clock,
    ) -> Result<()> {
        let weapon = self.weapons.get_mut(&id).ok_or(RuntimeError::UnknownWeapon(id))?;
        self.kills.register_hit(id, &hit, locally_owned);
        weapon.invoke(&mut Context::PreHitDamageable(hit), clock);
        Ok(())
    }

    /// Attributes a kill to the weapon that last hit `target` and dispatches
    /// `PostKill` to it. Returns the credited weapon.
    pub fn on_target_killed(&mut self, target: TargetId, clock: &dyn Clock) -> Option<WeaponId> {
        let weapons = &self.weapons;
        let (id, kill) = self.kills.take_kill(target, |w| weapons.contains_key(&w))?;
        let weapon = self.weapons.get_mut(&id)?;
        weapon.invoke(&mut Context::PostKill(kill), clock);
        debug!(target: "runtime::manager", weapon = ?id, ?target, "kill attributed");
        Some(id)
    }

    pub fn kill_tracker(&mut self) -> &mut KillTracker {
        &mut self.kills
    }

    // ===== sync =====

    /// Sync messages emitted by every weapon since the last drain.
    pub fn drain_sync_messages(&mut self) -> Vec<SyncMessage> {
        self.weapons
            .values_mut()
            .flat_map(CustomWeapon::drain_sync_messages)
            .collect()
    }

    pub fn apply_sync(&mut self, message: &SyncMessage, clock: &dyn Clock) -> Result<()> {
        let weapon = self
            .weapons
            .get_mut(&message.weapon)
            .ok_or(RuntimeError::UnknownWeapon(message.weapon))?;
        weapon.apply_sync(message, clock)
    }

    // ===== teardown =====

    /// Level cleanup: clears every weapon and drops kill tracking.
    pub fn reset_weapons(&mut self, clock: &dyn Clock) {
        for weapon in self.weapons.values_mut() {
            weapon.clear(clock);
        }
        self.weapons.clear();
        self.kills.reset();
        info!(target: "runtime::manager", "weapons reset");
    }

    /// Archetype ids with custom data for `category`.
    pub fn archetypes(&self, category: WeaponCategory) -> impl Iterator<Item = u32> + '_ {
        self.catalog
            .iter()
            .filter(move |data| data.category == category)
            .map(|data| data.archetype_id)
    }
}
