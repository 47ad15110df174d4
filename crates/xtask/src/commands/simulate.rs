//! Scripted firing simulation
//!
//! Spawns one gun from the catalog and fires a fixed sequence of shots at the
//! weapon's own (modified) fire rate, landing every shot on a target and
//! killing it on a fixed cadence.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use console::style;
use tracing::{debug, info};
use weapon_core::{
    Clock, Context, DamageQuery, DamageType, DamageableHitContext, HitContext, ManualClock,
    TargetId, Vec3, WeaponEffect, WeaponId,
};
use weapon_runtime::{ShotTimers, WeaponManager};

use crate::utils;

/// Fire a scripted sequence through one weapon
#[derive(Parser)]
pub struct Simulate {
    /// Gun archetype id to spawn
    #[arg(value_name = "ARCHETYPE")]
    archetype: u32,

    /// Number of shots to fire
    #[arg(short, long, default_value_t = 20)]
    shots: u32,

    /// Archetype shot delay in seconds
    #[arg(long, default_value_t = 0.1)]
    shot_delay: f32,

    /// Archetype burst delay in seconds
    #[arg(long, default_value_t = 0.0)]
    burst_delay: f32,

    /// Base damage per shot
    #[arg(long, default_value_t = 10.0)]
    damage: f32,

    /// Kill the current target every N hits (0 disables kills)
    #[arg(long, default_value_t = 5)]
    kill_every: u32,

    /// Land shots on the target's weakspot
    #[arg(long)]
    weakspot: bool,

    /// Data directory (defaults to WEAPON_DATA_DIR)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
}

impl Simulate {
    pub fn execute(self) -> Result<()> {
        let config = utils::runtime_config(self.data_dir.clone())?;
        let mut manager = WeaponManager::load(&config)?;
        let mut clock = ManualClock::new(0.0);
        let id = WeaponId(1);

        let weapon =
            manager.spawn_gun(id, self.archetype, self.shot_delay, self.burst_delay, &clock)?;
        weapon.owner_init(&clock);
        weapon.update_stored_fire_rate(ShotTimers::default(), &clock);
        info!(
            target: "xtask::simulate",
            archetype = self.archetype,
            shots = self.shots,
            properties = weapon.registry().len(),
            "simulation started"
        );

        println!(
            "{} archetype {} ({} properties, base {:.2} shots/s)",
            style("Simulating").bold().cyan(),
            self.archetype,
            weapon.registry().len(),
            weapon.base_fire_rate()
        );
        println!();
        println!(
            "{}",
            style(format!(
                "{:>4} {:>8} {:>9} {:>9} {:>8}  effects",
                "shot", "time", "rate", "damage", "recoil"
            ))
            .bold()
        );

        let mut damage_type = DamageType::BULLET;
        if self.weakspot {
            damage_type |= DamageType::WEAKSPOT;
        }

        let mut target = 1u64;
        let mut timers = ShotTimers::default();
        for shot in 1..=self.shots {
            let weapon = manager
                .get_mut(id)
                .ok_or_else(|| anyhow::anyhow!("weapon {id:?} disappeared"))?;

            weapon.update_stored_fire_rate(timers, &clock);
            let rate = weapon.fire_rate();
            let dealt = weapon
                .damage(
                    DamageQuery::new(self.damage, damage_type).with_target(TargetId(target)),
                    &clock,
                )
                .damage();
            let recoil = weapon.recoil(1.0, &clock);

            weapon.invoke_pass(&mut [Context::PreFire, Context::Fire], &clock);
            timers = weapon.next_shot_timers(clock.now(), timers, true);

            let hit = DamageableHitContext::new(
                HitContext::new(Vec3::new(0.0, 0.0, 10.0), Vec3::FORWARD, 1.0, damage_type),
                TargetId(target),
                dealt,
            );
            weapon.invoke(&mut Context::PreHit(hit.hit().clone()), &clock);
            weapon.invoke(&mut Context::HitDamageable(hit.clone()), &clock);
            manager.on_pre_hit_damageable(id, hit, true, &clock)?;

            if self.kill_every > 0 && shot % self.kill_every == 0 {
                let credited = manager.on_target_killed(TargetId(target), &clock);
                debug!(target: "xtask::simulate", shot, target, ?credited, "target killed");
                target += 1;
            }

            let weapon = manager
                .get_mut(id)
                .ok_or_else(|| anyhow::anyhow!("weapon {id:?} disappeared"))?;
            let effects = weapon.drain_effects();
            println!(
                "{:>4} {:>8.3} {:>9.2} {:>9.2} {:>8.3}  {}",
                shot,
                clock.now(),
                rate,
                dealt,
                recoil,
                describe(&effects)
            );

            clock.advance(1.0 / rate);
            weapon.update(&clock);
        }

        manager.reset_weapons(&clock);
        info!(target: "xtask::simulate", elapsed = clock.now(), "simulation finished");
        Ok(())
    }
}

fn describe(effects: &[WeaponEffect]) -> String {
    let parts: Vec<String> = effects
        .iter()
        .map(|effect| match effect {
            WeaponEffect::Ammo(request) => format!("ammo {:+}/{:+}", request.clip, request.reserve),
            WeaponEffect::Explosion(request) => {
                format!("explosion r={:.1}", request.settings.radius)
            }
            WeaponEffect::TriggerNeedsPress(flag) => format!("needs-press={flag}"),
            WeaponEffect::SyncTrigger { sync_id, value } => format!("sync#{sync_id}={value:.2}"),
            WeaponEffect::SyncReset { sync_id } => format!("sync#{sync_id} reset"),
        })
        .collect();
    if parts.is_empty() {
        style("-").dim().to_string()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
    }

    #[test]
    fn simulates_sample_pistol() {
        let command = Simulate {
            archetype: 1,
            shots: 6,
            shot_delay: 0.2,
            burst_delay: 0.0,
            damage: 10.0,
            kill_every: 3,
            weakspot: true,
            data_dir: Some(sample_data()),
        };
        command.execute().unwrap();
    }

    #[test]
    fn unknown_archetype_is_an_error() {
        let command = Simulate {
            archetype: 404,
            shots: 1,
            shot_delay: 0.1,
            burst_delay: 0.0,
            damage: 1.0,
            kill_every: 0,
            weakspot: false,
            data_dir: Some(sample_data()),
        };
        assert!(command.execute().is_err());
    }
}
