//! Dispatch ordering and template isolation across a full registry.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use weapon_core::{
    Context, ContextSet, DispatchCx, DispatchRegistry, DocumentWriter, FieldValue, ManualClock,
    PropertyList, StackKind, StatQuery, WeaponCategory, WeaponEffect, WeaponId, WeaponInfo,
    WeaponProperty, decode_list,
};

/// Records its tag as an additive fire-rate contribution.
#[derive(Debug)]
struct Marker(u8);

impl WeaponProperty for Marker {
    fn kind(&self) -> &'static str {
        "Marker"
    }

    fn contexts(&self) -> ContextSet {
        ContextSet::FIRE_RATE
    }

    fn invoke(&mut self, context: &mut Context, _cx: &mut DispatchCx<'_>) {
        if let Context::FireRate(query) = context {
            query.add_contribution(f32::from(self.0), StackKind::Add, 0);
        }
    }

    fn set_field(&mut self, _key: &str, _value: &FieldValue<'_>) {}

    fn encode(&self, _out: &mut DocumentWriter) {}

    fn clone_template(&self) -> Box<dyn WeaponProperty> {
        Box::new(Marker(self.0))
    }

    fn reset_state(&mut self) {}
}

struct Host {
    weapon: WeaponInfo,
    clock: ManualClock,
    effects: Vec<WeaponEffect>,
}

impl Host {
    fn new() -> Self {
        Self {
            weapon: WeaponInfo::new(WeaponId(3), WeaponCategory::Gun, 10.0),
            clock: ManualClock::new(0.0),
            effects: Vec::new(),
        }
    }

    fn cx(&mut self) -> DispatchCx<'_> {
        DispatchCx::new(&self.weapon, &self.clock, &mut self.effects)
    }
}

fn query_fire_rate(registry: &mut DispatchRegistry, host: &mut Host) -> StatQuery {
    let mut context = Context::FireRate(StatQuery::new(10.0));
    registry.invoke(&mut context, &mut host.cx());
    match context {
        Context::FireRate(query) => query,
        other => panic!("query context changed kind: {other:?}"),
    }
}

#[test]
fn contributions_follow_registration_order_under_random_toggling() {
    let mut host = Host::new();
    let mut registry = DispatchRegistry::new();
    let ids: Vec<_> = (1..=3)
        .map(|tag| registry.register(Box::new(Marker(tag)), &mut host.cx()).unwrap())
        .collect();

    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..100 {
        for &id in &ids {
            registry.set_active(id, rng.random_bool(0.5));
        }

        let expected: Vec<f32> = ids
            .iter()
            .zip(1u8..)
            .filter(|(id, _)| registry.is_active(**id))
            .map(|(_, tag)| f32::from(tag))
            .collect();

        let query = query_fire_rate(&mut registry, &mut host);
        let seen: Vec<f32> = query
            .accumulator()
            .contributions()
            .iter()
            .map(|c| c.amount)
            .collect();

        assert_eq!(seen, expected);
        assert_eq!(query.value(), 10.0 + expected.iter().sum::<f32>());
    }
}

#[test]
fn cloned_templates_do_not_share_state() {
    let document = json!([{
        "Name": "DamageMod",
        "Mod": 2.0,
        "Duration": 30,
        "Trigger": "Fire"
    }]);
    let (templates, errors) = decode_list(&document);
    assert!(errors.is_empty());

    let mut first_host = Host::new();
    let mut second_host = Host::new();
    let mut first = DispatchRegistry::new();
    let mut second = DispatchRegistry::new();
    for property in templates.clone_templates() {
        first.register(property, &mut first_host.cx()).unwrap();
    }
    for property in templates.clone() {
        second.register(property, &mut second_host.cx()).unwrap();
    }

    first.invoke(&mut Context::Fire, &mut first_host.cx());

    let damage = |registry: &mut DispatchRegistry, host: &mut Host| {
        let mut context = Context::Damage(weapon_core::DamageQuery::new(
            10.0,
            weapon_core::DamageType::BULLET,
        ));
        registry.invoke(&mut context, &mut host.cx());
        match context {
            Context::Damage(query) => query.damage(),
            other => panic!("query context changed kind: {other:?}"),
        }
    };

    assert_eq!(damage(&mut first, &mut first_host), 20.0);
    assert_eq!(damage(&mut second, &mut second_host), 10.0);

    // A fresh clone from the same templates starts clean as well.
    let mut third_host = Host::new();
    let mut third = DispatchRegistry::new();
    let fresh: PropertyList = templates.clone();
    for property in fresh {
        third.register(property, &mut third_host.cx()).unwrap();
    }
    assert_eq!(damage(&mut third, &mut third_host), 10.0);
}
