//! Every registered kind survives encode → decode with identical behavior.

use serde_json::{Value, json};
use weapon_core::{
    Context, DamageQuery, DamageType, DamageableHitContext, DispatchCx, DispatchRegistry,
    HitContext, KillContext, ManualClock, PROPERTY_KINDS, StatQuery, TargetId, Vec3,
    WeaponCategory, WeaponEffect, WeaponId, WeaponInfo, WeaponProperty, decode_list,
    decode_property, encode_list, encode_property,
};

fn documents() -> Value {
    json!([
        {
            "Name": "DamageMod",
            "Mod": 1.25,
            "Duration": 4,
            "StackType": "Multiply",
            "StackLayer": "Add",
            "Layer": 2,
            "Cap": 3,
            "Trigger": { "TriggerType": "WeakspotKill", "Amount": 2, "Cap": 4 }
        },
        {
            "Name": "FireRateMod",
            "Mod": 0.5,
            "Duration": 1.5,
            "StackType": "None",
            "Trigger": {
                "Activate": ["Fire", { "TriggerType": "Hit", "Blacklist": "Explosive" }],
                "Reset": "Reload",
                "Cooldown": 0.25
            }
        },
        { "Name": "RecoilMod", "Mod": 0.8 },
        {
            "Name": "Accelerate",
            "EndFireRate": 12,
            "EndDamageMod": 1.4,
            "AccelTime": 2,
            "DecelTime": 0.5,
            "DecelDelay": 0.2,
            "AccelExponent": 2,
            "ResetTrigger": "Reload"
        },
        {
            "Name": "AmmoMod",
            "ClipChange": 0.5,
            "ReserveChange": -1,
            "PullFromReserve": true,
            "ReceiverSlot": "Special",
            "Trigger": { "Activate": "Kill", "ResetDelay": 3 }
        },
        {
            "Name": "Explosive",
            "MaxDamage": 40,
            "MinDamage": 10,
            "InnerRadius": 1,
            "Radius": 4,
            "DamageFriendly": false,
            "SoundID": 1234,
            "GlowColor": [0, 0.5, 1],
            "Trigger": "BulletLanded"
        },
        { "Name": "AutoTrigger" }
    ])
}

#[test]
fn document_covers_every_kind() {
    let (list, errors) = decode_list(&documents());
    assert!(errors.is_empty(), "{errors:?}");
    let kinds: Vec<_> = list.iter().map(|p| p.kind()).collect();
    let expected: Vec<_> = PROPERTY_KINDS.iter().map(|entry| entry.name).collect();
    assert_eq!(kinds, expected);
}

#[test]
fn encoding_is_stable_across_round_trips() {
    let (list, _) = decode_list(&documents());
    let first = encode_list(&list);
    let (again, errors) = decode_list(&first);
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(encode_list(&again), first);

    for property in list.iter() {
        let encoded = encode_property(property.as_ref());
        let decoded = decode_property(&encoded).expect("encoded module decodes");
        assert_eq!(decoded.kind(), property.kind());
        assert_eq!(decoded.contexts(), property.contexts());
        assert_eq!(decoded.trigger(), property.trigger());
        assert_eq!(encode_property(decoded.as_ref()), encoded);
    }
}

struct Host {
    weapon: WeaponInfo,
    clock: ManualClock,
    effects: Vec<WeaponEffect>,
}

impl Host {
    fn cx(&mut self) -> DispatchCx<'_> {
        DispatchCx::new(&self.weapon, &self.clock, &mut self.effects)
    }
}

#[derive(Debug, PartialEq)]
struct Observation {
    fire_rate: f32,
    damage: f32,
    recoil: f32,
    effects: Vec<WeaponEffect>,
}

fn hit(damage_type: DamageType) -> DamageableHitContext {
    DamageableHitContext::new(
        HitContext::new(Vec3::new(1.0, 0.0, 5.0), Vec3::FORWARD, 0.8, damage_type),
        TargetId(9),
        30.0,
    )
}

/// Drives a registry through a scripted fight and samples every query.
fn observe(properties: Vec<Box<dyn WeaponProperty>>) -> Vec<Observation> {
    let mut host = Host {
        weapon: WeaponInfo::new(WeaponId(1), WeaponCategory::Gun, 8.0),
        clock: ManualClock::new(0.0),
        effects: Vec::new(),
    };
    let mut registry = DispatchRegistry::new();
    for property in properties {
        registry.register(property, &mut host.cx()).unwrap();
    }
    registry.invoke(&mut Context::Setup, &mut host.cx());

    let weakspot = DamageType::BULLET | DamageType::WEAKSPOT;
    let mut samples = Vec::new();
    for step in 0..12u8 {
        host.clock.advance(0.1);
        let mut pass = vec![Context::PreFire, Context::Fire];
        pass.push(Context::PreHit(hit(DamageType::BULLET).hit().clone()));
        pass.push(Context::HitDamageable(hit(weakspot)));
        if step % 4 == 3 {
            pass.push(Context::PostKill(KillContext::from_hit(&hit(weakspot))));
        }
        if step == 8 {
            pass.push(Context::Reload);
        }
        registry.invoke_pass(&mut pass, &mut host.cx());
        registry.invoke(&mut Context::Update, &mut host.cx());

        let mut fire_rate = Context::FireRate(StatQuery::new(8.0));
        let mut damage = Context::Damage(DamageQuery::new(20.0, weakspot));
        let mut recoil = Context::Recoil(StatQuery::new(1.0));
        registry.invoke(&mut fire_rate, &mut host.cx());
        registry.invoke(&mut damage, &mut host.cx());
        registry.invoke(&mut recoil, &mut host.cx());

        let (Context::FireRate(f), Context::Damage(d), Context::Recoil(r)) =
            (fire_rate, damage, recoil)
        else {
            panic!("query contexts changed kind");
        };
        samples.push(Observation {
            fire_rate: f.value(),
            damage: d.damage(),
            recoil: r.value(),
            effects: std::mem::take(&mut host.effects),
        });
    }
    samples
}

#[test]
fn decoded_copies_behave_like_their_source() {
    let (list, _) = decode_list(&documents());
    let (reparsed, _) = decode_list(&encode_list(&list));

    let original = observe(list.clone_templates());
    let round_tripped = observe(reparsed.clone_templates());
    assert_eq!(original, round_tripped);
    assert!(original.iter().any(|sample| !sample.effects.is_empty()));
}
