use std::fs;

use weapon_core::{
    DamageType, DamageableHitContext, EngineConfig, HitContext, ManualClock, TargetId, Vec3,
    WeaponEffect, WeaponId,
};
use weapon_runtime::{RuntimeConfig, RuntimeError, ShotTimers, SyncPayload, WeaponManager};

const RIFLE: u32 = 100;

fn write_content(dir: &std::path::Path) {
    fs::write(dir.join("config.toml"), "max_fire_rate = 40.0\n").unwrap();
    fs::write(
        dir.join("weapons.json"),
        r#"{ "Weapons": [ {
            "ArchetypeID": 100,
            "Name": "Rifle",
            "Properties": [
                { "Name": "FireRateMod", "Mod": 1.5, "Duration": 5, "Trigger": "Kill" },
                { "Name": "AmmoMod", "ClipChange": 1, "Trigger": "Kill" }
            ]
        } ] }"#,
    )
    .unwrap();
}

fn hit_on(target: u64) -> DamageableHitContext {
    DamageableHitContext::new(
        HitContext::new(Vec3::new(0.0, 1.0, 8.0), Vec3::FORWARD, 1.0, DamageType::BULLET),
        TargetId(target),
        40.0,
    )
}

/// Local kill → fire-rate buff and ammo refund → broadcast → remote mirror.
#[test]
fn kill_buff_reaches_remote_mirror() {
    let dir = tempfile::tempdir().unwrap();
    write_content(dir.path());
    let config = RuntimeConfig {
        data_dir: dir.path().to_path_buf(),
        engine: EngineConfig::default(),
    };
    let mut clock = ManualClock::new(1.0);

    // ================================================================
    // Local peer: spawn, hit, kill
    // ================================================================
    let mut local = WeaponManager::load(&config).unwrap();
    let weapon = local
        .spawn_gun(WeaponId(1), RIFLE, 0.1, 0.0, &clock)
        .unwrap();
    weapon.owner_init(&clock);
    assert_eq!(weapon.registry().len(), 2);

    local
        .on_pre_hit_damageable(WeaponId(1), hit_on(7), true, &clock)
        .unwrap();
    assert_eq!(local.on_target_killed(TargetId(7), &clock), Some(WeaponId(1)));
    assert_eq!(local.on_target_killed(TargetId(7), &clock), None);

    let weapon = local.get_mut(WeaponId(1)).unwrap();
    weapon.update_stored_fire_rate(ShotTimers::default(), &clock);
    assert!((weapon.fire_rate() - 15.0).abs() < 1e-3);

    let messages = local.drain_sync_messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].sync_id, 0);
    assert_eq!(messages[0].payload, SyncPayload::Trigger { value: 1.5 });

    let effects = local.get_mut(WeaponId(1)).unwrap().drain_effects();
    assert!(effects.iter().any(|effect| matches!(
        effect,
        WeaponEffect::Ammo(request) if request.clip == 1
    )));

    // ================================================================
    // Remote peer: mirror the same weapon and apply the broadcast
    // ================================================================
    let mut remote = WeaponManager::load(&config).unwrap();
    remote
        .spawn_gun(WeaponId(1), RIFLE, 0.1, 0.0, &clock)
        .unwrap();
    remote.set_to_sync(WeaponId(1), RIFLE, &clock).unwrap();

    for message in &messages {
        let wire = message.to_json().unwrap();
        let received = weapon_runtime::SyncMessage::from_json(&wire).unwrap();
        remote.apply_sync(&received, &clock).unwrap();
    }

    let mirror = remote.get_mut(WeaponId(1)).unwrap();
    assert!(mirror.is_synced());
    mirror.update_stored_fire_rate(ShotTimers::default(), &clock);
    assert!((mirror.fire_rate() - 15.0).abs() < 1e-3);

    // The buff expires on both peers.
    clock.advance(6.0);
    mirror.update_stored_fire_rate(ShotTimers::default(), &clock);
    assert!((mirror.fire_rate() - 10.0).abs() < 1e-3);

    // ================================================================
    // Level teardown
    // ================================================================
    local.reset_weapons(&clock);
    assert!(local.is_empty());
    assert!(local.kill_tracker().is_empty());
}

#[test]
fn unknown_targets_and_ids_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_content(dir.path());
    let config = RuntimeConfig {
        data_dir: dir.path().to_path_buf(),
        engine: EngineConfig::default(),
    };
    let clock = ManualClock::new(0.0);
    let mut manager = WeaponManager::load(&config).unwrap();

    assert!(matches!(
        manager.spawn_gun(WeaponId(2), 999, 0.1, 0.0, &clock),
        Err(RuntimeError::MissingData { archetype_id: 999, .. })
    ));
    assert!(matches!(
        manager.on_pre_hit_damageable(WeaponId(2), hit_on(1), true, &clock),
        Err(RuntimeError::UnknownWeapon(WeaponId(2)))
    ));

    manager
        .spawn_gun(WeaponId(3), RIFLE, 0.1, 0.0, &clock)
        .unwrap();
    let weapon = manager.get_mut(WeaponId(3)).unwrap();
    assert!(matches!(
        weapon.apply_synced_value(5, 2.0, &clock),
        Err(RuntimeError::UnknownSyncId { sync_id: 5, .. })
    ));
    assert_eq!(manager.on_target_killed(TargetId(42), &clock), None);
}

#[test]
fn environment_overrides_content_tuning() {
    let dir = tempfile::tempdir().unwrap();
    write_content(dir.path());
    let config = RuntimeConfig {
        data_dir: dir.path().to_path_buf(),
        engine: EngineConfig::with_max_fire_rate(12.0),
    };
    let clock = ManualClock::new(0.0);
    let mut manager = WeaponManager::load(&config).unwrap();
    let weapon = manager
        .spawn_gun(WeaponId(1), RIFLE, 0.01, 0.0, &clock)
        .unwrap();

    weapon.update_stored_fire_rate(ShotTimers::default(), &clock);
    assert_eq!(weapon.fire_rate(), 12.0);
}
