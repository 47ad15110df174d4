//! Trigger sub-document codec.
//!
//! Accepted shapes:
//!
//! ```text
//! "WeakspotKill"                                   single definition by name
//! { "TriggerType": "Damage", "Cap": 50, ... }      flat definition
//! [ "Fire", { "TriggerType": "Kill" } ]            several activation definitions
//! { "Activate": ..., "Reset": ..., "Cooldown": 1, "ResetDelay": 3 }
//! ```

use serde_json::{Map, Value};

use crate::codec::{DocumentWriter, FieldValue, normalize_key};
use crate::damage::DamageType;
use crate::trigger::{TriggerCoordinator, TriggerDefinition, TriggerName};

const NAME_KEYS: &[&str] = &["triggertype", "trigger", "type", "name"];

/// Decodes a trigger sub-document. Returns `None` when no activation
/// definition could be resolved.
pub fn decode_trigger(value: &Value) -> Option<TriggerCoordinator> {
    let coordinator = match value {
        Value::Object(fields) if has_coordinator_keys(fields) => decode_coordinator(fields),
        _ => TriggerCoordinator::from_parts(decode_definitions(value), Vec::new()),
    };

    (!coordinator.activate().is_empty()).then_some(coordinator)
}

/// Encodes a coordinator into the most compact shape that decodes back to it.
pub fn encode_trigger(coordinator: &TriggerCoordinator) -> Value {
    if coordinator.is_simple() {
        if let [definition] = coordinator.activate() {
            return encode_definition(definition);
        }
    }

    let mut writer = DocumentWriter::new();
    writer.value("Activate", encode_definitions(coordinator.activate()));
    if !coordinator.reset().is_empty() {
        writer.value("Reset", encode_definitions(coordinator.reset()));
    }
    if coordinator.cooldown() > 0.0 {
        writer.number("Cooldown", coordinator.cooldown());
    }
    if coordinator.reset_delay() > 0.0 {
        writer.number("ResetDelay", coordinator.reset_delay());
    }
    writer.finish()
}

fn has_coordinator_keys(fields: &Map<String, Value>) -> bool {
    fields
        .keys()
        .any(|key| matches!(normalize_key(key).as_str(), "activate" | "reset"))
}

fn decode_coordinator(fields: &Map<String, Value>) -> TriggerCoordinator {
    let mut coordinator = TriggerCoordinator::default();
    for (key, value) in fields {
        let field = FieldValue::new(value);
        match normalize_key(key).as_str() {
            "activate" => decode_definitions(value)
                .into_iter()
                .for_each(|d| coordinator.push_activate(d)),
            "reset" => decode_definitions(value)
                .into_iter()
                .for_each(|d| coordinator.push_reset(d)),
            "cooldown" => {
                if let Some(cooldown) = field.as_f32() {
                    coordinator.set_cooldown(cooldown);
                }
            }
            "resetdelay" => {
                if let Some(delay) = field.as_f32() {
                    coordinator.set_reset_delay(delay);
                }
            }
            _ => {}
        }
    }
    coordinator
}

fn decode_definitions(value: &Value) -> Vec<TriggerDefinition> {
    match value {
        Value::String(name) => TriggerName::parse(name)
            .map(|(name, tags)| TriggerDefinition::new(name).with_damage_type(tags))
            .into_iter()
            .collect(),
        Value::Object(fields) => decode_definition_object(fields).into_iter().collect(),
        Value::Array(items) => items.iter().flat_map(decode_definitions).collect(),
        _ => Vec::new(),
    }
}

fn decode_definition_object(fields: &Map<String, Value>) -> Option<TriggerDefinition> {
    let (name, tags) = fields
        .iter()
        .filter(|(key, _)| NAME_KEYS.contains(&normalize_key(key).as_str()))
        .find_map(|(_, value)| value.as_str().and_then(TriggerName::parse))?;

    let mut definition = TriggerDefinition::new(name).with_damage_type(tags);
    for (key, value) in fields {
        definition.set_field(&normalize_key(key), &FieldValue::new(value));
    }
    Some(definition)
}

fn encode_definitions(definitions: &[TriggerDefinition]) -> Value {
    match definitions {
        [single] => encode_definition(single),
        many => Value::Array(many.iter().map(encode_definition).collect()),
    }
}

/// Name written for `definition` and the mask that name implies on decode.
fn encoded_name(definition: &TriggerDefinition) -> (String, DamageType) {
    let mask = definition.damage_type();
    if definition.name() == TriggerName::BulletLanded
        && mask.contains(DamageType::MELEE)
        && !mask.contains(DamageType::BULLET)
    {
        return ("MeleeLanded".to_string(), DamageType::MELEE);
    }
    (definition.name().to_string(), definition.name().default_damage_type())
}

fn encode_definition(definition: &TriggerDefinition) -> Value {
    let (name, implied) = encoded_name(definition);
    let extra = definition.damage_type().difference(implied);
    let plain = definition.amount() == 1.0
        && definition.cap() == 0.0
        && extra.is_empty()
        && definition.blacklist().is_empty();
    if plain {
        return Value::String(name);
    }

    let mut writer = DocumentWriter::new();
    writer.string("TriggerType", name);
    if definition.amount() != 1.0 {
        writer.number("Amount", definition.amount());
    }
    if !extra.is_empty() {
        writer.string("DamageType", extra.mask_names());
    }
    if !definition.blacklist().is_empty() {
        writer.string("Blacklist", definition.blacklist().mask_names());
    }
    if definition.cap() > 0.0 {
        writer.number("Cap", definition.cap());
    }
    writer.finish()
}
