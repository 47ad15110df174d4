use crate::codec::{DocumentWriter, FieldValue};
use crate::context::{Context, ContextSet, Vec3};
use crate::damage::DamageType;
use crate::property::{DispatchCx, WeaponEffect, WeaponProperty};
use crate::trigger::{TriggerCoordinator, TriggerDefinition, TriggerHit, TriggerName};

/// Pull-back applied along the shot direction for hits on level geometry, so
/// the explosion starts in front of the wall rather than inside it.
const WALL_HIT_BUFFER: f32 = -0.03;

/// Default explosion sound, the sticky mine detonation event.
pub const STICKY_MINE_EXPLODE: u32 = sound_event_id("STICKYMINEEXPLODE");

/// Host sound event id for an event name: 32-bit FNV-1 over the lowercased
/// bytes, matching the audio engine's string lookup.
pub const fn sound_event_id(name: &str) -> u32 {
    let bytes = name.as_bytes();
    let mut hash: u32 = 0x811c_9dc5;
    let mut i = 0;
    while i < bytes.len() {
        hash = hash.wrapping_mul(0x0100_0193);
        hash ^= bytes[i].to_ascii_lowercase() as u32;
        i += 1;
    }
    hash
}

/// Explosion tuning carried verbatim into every request.
#[derive(Clone, Debug, PartialEq)]
pub struct ExplosionSettings {
    pub max_damage: f32,
    pub min_damage: f32,
    pub inner_radius: f32,
    pub radius: f32,
    pub precision_multi: f32,
    pub stagger_multi: f32,
    pub ignore_falloff: bool,
    pub damage_limb: bool,
    pub ignore_armor: bool,
    pub ignore_backstab: bool,
    pub ignore_damage_mods: bool,
    pub friendly_multi: f32,
    pub damage_friendly: bool,
    pub damage_owner: bool,
    pub damage_locks: bool,
    /// Host sound event id.
    pub sound_id: u32,
    pub glow_color: [f32; 4],
    pub glow_duration: f32,
    pub glow_fade_duration: f32,
}

impl Default for ExplosionSettings {
    fn default() -> Self {
        Self {
            max_damage: 0.0,
            min_damage: 0.0,
            inner_radius: 0.0,
            radius: 0.0,
            precision_multi: 0.0,
            stagger_multi: 1.0,
            ignore_falloff: false,
            damage_limb: true,
            ignore_armor: false,
            ignore_backstab: false,
            ignore_damage_mods: false,
            friendly_multi: 1.0,
            damage_friendly: true,
            damage_owner: true,
            damage_locks: true,
            sound_id: STICKY_MINE_EXPLODE,
            glow_color: [1.0, 0.2, 0.0, 1.0],
            glow_duration: 0.1,
            glow_fade_duration: 0.1,
        }
    }
}

/// Where an explosion is centered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExplosionOrigin {
    pub position: Vec3,
    pub direction: Vec3,
}

/// Area effect the host should spawn.
#[derive(Clone, Debug, PartialEq)]
pub struct ExplosionRequest {
    /// `None` centers the explosion on the owner's view.
    pub origin: Option<ExplosionOrigin>,
    pub falloff: f32,
    pub backstab: f32,
    /// Trigger weight; scales the explosion damage.
    pub amount: f32,
    pub settings: ExplosionSettings,
}

/// Spawns one explosion per trigger hit.
///
/// Defaults to triggering on `BulletLanded`. Explosive damage is always
/// blacklisted, so explosions never chain into further explosions.
#[derive(Debug)]
pub struct Explosive {
    settings: ExplosionSettings,
    trigger: TriggerCoordinator,
}

impl Default for Explosive {
    fn default() -> Self {
        Self::with_settings(ExplosionSettings::default())
    }
}

impl Explosive {
    pub fn with_settings(settings: ExplosionSettings) -> Self {
        let mut explosive = Self {
            settings,
            trigger: TriggerCoordinator::new(TriggerDefinition::new(TriggerName::BulletLanded)),
        };
        explosive.trigger.add_blacklist(DamageType::EXPLOSIVE);
        explosive
    }

    pub fn settings(&self) -> &ExplosionSettings {
        &self.settings
    }

    fn request_for(&self, hit: &TriggerHit) -> ExplosionRequest {
        let scale_falloff = |raw: f32| if self.settings.ignore_falloff { 1.0 } else { raw };

        let (origin, falloff, backstab) = match &hit.source {
            Context::PostKill(kill) => (
                Some(ExplosionOrigin {
                    position: kill.position(),
                    direction: kill.direction(),
                }),
                scale_falloff(kill.falloff()),
                kill.backstab(),
            ),
            Context::PreHitDamageable(target) | Context::HitDamageable(target) => (
                Some(ExplosionOrigin {
                    position: target.hit().position(),
                    direction: target.hit().direction(),
                }),
                scale_falloff(target.hit().falloff()),
                target.backstab(),
            ),
            Context::PreHit(landed) => (
                Some(ExplosionOrigin {
                    position: if landed.is_damageable() {
                        landed.position()
                    } else {
                        landed.position() + landed.direction().scale(WALL_HIT_BUFFER)
                    },
                    direction: landed.direction(),
                }),
                scale_falloff(landed.falloff()),
                0.0,
            ),
            _ => (None, 1.0, 0.0),
        };

        ExplosionRequest {
            origin,
            falloff,
            backstab,
            amount: hit.amount,
            settings: self.settings.clone(),
        }
    }
}

impl WeaponProperty for Explosive {
    fn kind(&self) -> &'static str {
        "Explosive"
    }

    fn contexts(&self) -> ContextSet {
        ContextSet::empty()
    }

    fn trigger(&self) -> Option<&TriggerCoordinator> {
        Some(&self.trigger)
    }

    fn trigger_mut(&mut self) -> Option<&mut TriggerCoordinator> {
        Some(&mut self.trigger)
    }

    fn set_trigger(&mut self, trigger: TriggerCoordinator) {
        self.trigger = trigger;
        self.trigger.add_blacklist(DamageType::EXPLOSIVE);
    }

    fn on_trigger_apply(&mut self, hits: &[TriggerHit], cx: &mut DispatchCx<'_>) {
        for hit in hits {
            cx.emit(WeaponEffect::Explosion(self.request_for(hit)));
        }
    }

    fn set_field(&mut self, key: &str, value: &FieldValue<'_>) {
        let s = &mut self.settings;
        let number = value.as_f32();
        let flag = value.as_bool();
        match key {
            "maxdamage" => s.max_damage = number.unwrap_or(s.max_damage),
            "mindamage" => s.min_damage = number.unwrap_or(s.min_damage),
            "innerradius" | "minradius" => s.inner_radius = number.unwrap_or(s.inner_radius),
            "radius" | "maxradius" => s.radius = number.unwrap_or(s.radius),
            "precisiondamagemulti" | "precisionmulti" | "precisionmult" | "precision" => {
                s.precision_multi = number.unwrap_or(s.precision_multi);
            }
            "staggerdamagemulti" | "staggermulti" | "staggermult" | "stagger" => {
                s.stagger_multi = number.unwrap_or(s.stagger_multi);
            }
            "ignorefalloff" => s.ignore_falloff = flag.unwrap_or(s.ignore_falloff),
            "damagelimb" => s.damage_limb = flag.unwrap_or(s.damage_limb),
            "ignorearmor" => s.ignore_armor = flag.unwrap_or(s.ignore_armor),
            "ignorebackstab" | "ignorebackdamage" | "ignorebackbonus" => {
                s.ignore_backstab = flag.unwrap_or(s.ignore_backstab);
            }
            "ignoredamagemods" | "ignoredamagemod" => {
                s.ignore_damage_mods = flag.unwrap_or(s.ignore_damage_mods);
            }
            "friendlydamagemulti" | "friendlymulti" | "friendlymult" => {
                s.friendly_multi = number.unwrap_or(s.friendly_multi);
            }
            "damagefriendly" | "friendlyfire" => {
                s.damage_friendly = flag.unwrap_or(s.damage_friendly);
            }
            "damageowner" | "damageuser" => s.damage_owner = flag.unwrap_or(s.damage_owner),
            "damagelocks" => s.damage_locks = flag.unwrap_or(s.damage_locks),
            "soundid" | "sound" => {
                s.sound_id = value
                    .as_u32()
                    .or_else(|| value.as_str().map(sound_event_id))
                    .unwrap_or(s.sound_id);
            }
            "glowcolor" | "color" => {
                if let Some(color) = parse_color(value) {
                    s.glow_color = color;
                }
            }
            "glowduration" | "duration" => s.glow_duration = number.unwrap_or(s.glow_duration),
            "glowfadeduration" | "fadeduration" => {
                s.glow_fade_duration = number.unwrap_or(s.glow_fade_duration);
            }
            _ => {}
        }
    }

    fn encode(&self, out: &mut DocumentWriter) {
        let s = &self.settings;
        out.number("MaxDamage", s.max_damage)
            .number("MinDamage", s.min_damage)
            .number("InnerRadius", s.inner_radius)
            .number("Radius", s.radius)
            .number("PrecisionDamageMulti", s.precision_multi)
            .number("StaggerDamageMulti", s.stagger_multi)
            .boolean("IgnoreFalloff", s.ignore_falloff)
            .boolean("DamageLimb", s.damage_limb)
            .boolean("IgnoreArmor", s.ignore_armor)
            .boolean("IgnoreBackstab", s.ignore_backstab)
            .boolean("IgnoreDamageMods", s.ignore_damage_mods)
            .number("FriendlyDamageMulti", s.friendly_multi)
            .boolean("DamageFriendly", s.damage_friendly)
            .boolean("DamageOwner", s.damage_owner)
            .boolean("DamageLocks", s.damage_locks)
            .integer("SoundID", i64::from(s.sound_id))
            .value("GlowColor", encode_color(s.glow_color))
            .number("GlowDuration", s.glow_duration)
            .number("GlowFadeDuration", s.glow_fade_duration);
    }

    fn clone_template(&self) -> Box<dyn WeaponProperty> {
        Box::new(Self {
            settings: self.settings.clone(),
            trigger: self.trigger.clone_config(),
        })
    }

    fn reset_state(&mut self) {
        self.trigger.clear_state();
    }
}

/// `{ "r", "g", "b", "a" }` objects or `[r, g, b, a?]` arrays.
fn parse_color(value: &FieldValue<'_>) -> Option<[f32; 4]> {
    let channel = |v: &serde_json::Value| FieldValue::new(v).as_f32();
    match value.raw() {
        serde_json::Value::Array(items) if items.len() >= 3 => {
            let mut color = [1.0; 4];
            for (slot, item) in color.iter_mut().zip(items) {
                *slot = channel(item)?;
            }
            Some(color)
        }
        serde_json::Value::Object(fields) => {
            let mut color = [1.0; 4];
            for (key, item) in fields {
                let index = match crate::codec::normalize_key(key).as_str() {
                    "r" => 0,
                    "g" => 1,
                    "b" => 2,
                    "a" => 3,
                    _ => continue,
                };
                color[index] = channel(item)?;
            }
            Some(color)
        }
        _ => None,
    }
}

fn encode_color(color: [f32; 4]) -> serde_json::Value {
    let [r, g, b, a] = color.map(f64::from);
    serde_json::json!({ "r": r, "g": g, "b": b, "a": a })
}
