//! Configuration codec: JSON documents to property modules and back.
//!
//! A module document is an object whose `Name` field selects the kind through
//! [`PROPERTY_KINDS`]. Every other key is normalized with [`normalize_key`]
//! and offered to the module's `set_field`; `Trigger` keys are decoded here
//! and handed over through `set_trigger`. Unknown keys are ignored and invalid
//! values leave the documented defaults in place.
//!
//! ```
//! # use weapon_core::{decode_property, encode_property};
//! let doc = serde_json::json!({ "Name": "DamageMod", "Mod": 1.5, "Trigger": "Kill" });
//! let module = decode_property(&doc).unwrap();
//! assert_eq!(module.kind(), "DamageMod");
//! assert_eq!(decode_property(&encode_property(module.as_ref())).unwrap().kind(), "DamageMod");
//! ```

mod fields;
mod trigger;

pub use fields::{DocumentWriter, FieldValue};
pub use trigger::{decode_trigger, encode_trigger};

use serde_json::Value;

use crate::error::CodecError;
use crate::property::{
    Accelerate, AmmoMod, AutoTrigger, Explosive, PropertyList, StatMod, WeaponProperty,
};

/// Lowercases and strips whitespace: `"Stack Layer"` → `"stacklayer"`.
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// One entry of the closed module kind table.
#[derive(Clone, Copy, Debug)]
pub struct PropertyKindEntry {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub build: fn() -> Box<dyn WeaponProperty>,
}

impl PropertyKindEntry {
    pub fn matches(&self, name: &str) -> bool {
        let name = normalize_key(name);
        normalize_key(self.name) == name || self.aliases.iter().any(|alias| *alias == name)
    }
}

/// Every constructible module kind. Aliases are pre-normalized.
pub const PROPERTY_KINDS: &[PropertyKindEntry] = &[
    PropertyKindEntry {
        name: "DamageMod",
        aliases: &["damagemodifier", "damage"],
        build: build_damage_mod,
    },
    PropertyKindEntry {
        name: "FireRateMod",
        aliases: &["fireratemodifier", "firerate"],
        build: build_fire_rate_mod,
    },
    PropertyKindEntry {
        name: "RecoilMod",
        aliases: &["recoilmodifier", "recoil"],
        build: build_recoil_mod,
    },
    PropertyKindEntry {
        name: "Accelerate",
        aliases: &["acceleration", "accel"],
        build: build_accelerate,
    },
    PropertyKindEntry {
        name: "AmmoMod",
        aliases: &["ammomodifier", "ammo"],
        build: build_ammo_mod,
    },
    PropertyKindEntry {
        name: "Explosive",
        aliases: &["explosion", "explode"],
        build: build_explosive,
    },
    PropertyKindEntry {
        name: "AutoTrigger",
        aliases: &["automatic", "fullauto"],
        build: build_auto_trigger,
    },
];

fn build_damage_mod() -> Box<dyn WeaponProperty> {
    Box::new(StatMod::damage())
}

fn build_fire_rate_mod() -> Box<dyn WeaponProperty> {
    Box::new(StatMod::fire_rate())
}

fn build_recoil_mod() -> Box<dyn WeaponProperty> {
    Box::new(StatMod::recoil())
}

fn build_accelerate() -> Box<dyn WeaponProperty> {
    Box::new(Accelerate::default())
}

fn build_ammo_mod() -> Box<dyn WeaponProperty> {
    Box::new(AmmoMod::default())
}

fn build_explosive() -> Box<dyn WeaponProperty> {
    Box::new(Explosive::default())
}

fn build_auto_trigger() -> Box<dyn WeaponProperty> {
    Box::new(AutoTrigger::default())
}

/// Resolves a kind name or alias against [`PROPERTY_KINDS`].
pub fn find_kind(name: &str) -> Option<&'static PropertyKindEntry> {
    PROPERTY_KINDS.iter().find(|entry| entry.matches(name))
}

/// Decodes one module document into a fresh template.
pub fn decode_property(document: &Value) -> Result<Box<dyn WeaponProperty>, CodecError> {
    let fields = document.as_object().ok_or(CodecError::NotAnObject)?;

    let name = fields
        .iter()
        .find(|(key, _)| normalize_key(key) == "name")
        .and_then(|(_, value)| value.as_str())
        .ok_or(CodecError::MissingName)?;

    let entry = find_kind(name).ok_or_else(|| CodecError::UnknownKind(name.to_string()))?;
    let mut property = (entry.build)();

    for (key, value) in fields {
        match normalize_key(key).as_str() {
            "name" => {}
            "trigger" | "triggers" => {
                if let Some(trigger) = decode_trigger(value) {
                    property.set_trigger(trigger);
                }
            }
            normalized => property.set_field(normalized, &FieldValue::new(value)),
        }
    }

    Ok(property)
}

/// Decodes an array of module documents.
///
/// Entries that fail are skipped and reported alongside the decoded list, in
/// document order.
pub fn decode_list(document: &Value) -> (PropertyList, Vec<CodecError>) {
    let Some(entries) = document.as_array() else {
        return (PropertyList::new(), vec![CodecError::NotAList]);
    };

    let mut list = PropertyList::new();
    let mut errors = Vec::new();
    for entry in entries {
        match decode_property(entry) {
            Ok(property) => list.push(property),
            Err(error) => errors.push(error),
        }
    }
    (list, errors)
}

/// Encodes one module: `Name`, the module's own fields, then `Trigger`.
pub fn encode_property(property: &dyn WeaponProperty) -> Value {
    let mut writer = DocumentWriter::new();
    writer.string("Name", property.kind());
    property.encode(&mut writer);
    if let Some(trigger) = property.trigger() {
        writer.value("Trigger", encode_trigger(trigger));
    }
    writer.finish()
}

pub fn encode_list(list: &PropertyList) -> Value {
    Value::Array(
        list.iter()
            .map(|property| encode_property(property.as_ref()))
            .collect(),
    )
}
