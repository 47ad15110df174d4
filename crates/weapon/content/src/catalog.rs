//! Per-archetype property templates.

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};
use weapon_core::{PropertyList, WeaponCategory, WeaponProperty, encode_list};

/// Configured property templates for one weapon archetype.
///
/// Templates are never registered directly; hosts take fresh copies through
/// [`CustomWeaponData::instantiate`].
#[derive(Clone, Debug)]
pub struct CustomWeaponData {
    pub archetype_id: u32,
    pub name: Option<String>,
    pub category: WeaponCategory,
    pub properties: PropertyList,
}

impl CustomWeaponData {
    pub fn new(archetype_id: u32, category: WeaponCategory, properties: PropertyList) -> Self {
        Self {
            archetype_id,
            name: None,
            category,
            properties,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Independent copies of every template, in document order.
    pub fn instantiate(&self) -> Vec<Box<dyn WeaponProperty>> {
        self.properties.clone_templates()
    }

    /// Catalog entry document in the same shape the loader reads.
    pub fn to_document(&self) -> Value {
        let mut entry = Map::new();
        entry.insert("ArchetypeID".into(), json!(self.archetype_id));
        if let Some(name) = &self.name {
            entry.insert("Name".into(), json!(name));
        }
        entry.insert("Category".into(), json!(self.category.to_string()));
        entry.insert("Properties".into(), encode_list(&self.properties));
        Value::Object(entry)
    }
}

/// Archetype id → weapon data, split by category.
///
/// Gun and melee archetype ids live in separate namespaces, matching how
/// hosts assign them.
#[derive(Clone, Debug, Default)]
pub struct WeaponCatalog {
    guns: BTreeMap<u32, CustomWeaponData>,
    melee: BTreeMap<u32, CustomWeaponData>,
}

impl WeaponCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `data`, returning the entry it replaced.
    pub fn insert(&mut self, data: CustomWeaponData) -> Option<CustomWeaponData> {
        self.table_mut(data.category).insert(data.archetype_id, data)
    }

    pub fn get(&self, category: WeaponCategory, archetype_id: u32) -> Option<&CustomWeaponData> {
        self.table(category).get(&archetype_id)
    }

    pub fn gun(&self, archetype_id: u32) -> Option<&CustomWeaponData> {
        self.guns.get(&archetype_id)
    }

    pub fn melee(&self, archetype_id: u32) -> Option<&CustomWeaponData> {
        self.melee.get(&archetype_id)
    }

    /// Merges `other` in; its entries win on id collisions.
    pub fn extend(&mut self, other: WeaponCatalog) {
        self.guns.extend(other.guns);
        self.melee.extend(other.melee);
    }

    /// Guns first, then melee, each in ascending archetype id.
    pub fn iter(&self) -> impl Iterator<Item = &CustomWeaponData> {
        self.guns.values().chain(self.melee.values())
    }

    pub fn len(&self) -> usize {
        self.guns.len() + self.melee.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guns.is_empty() && self.melee.is_empty()
    }

    pub fn to_document(&self) -> Value {
        json!({ "Weapons": self.iter().map(CustomWeaponData::to_document).collect::<Vec<_>>() })
    }

    fn table(&self, category: WeaponCategory) -> &BTreeMap<u32, CustomWeaponData> {
        match category {
            WeaponCategory::Gun => &self.guns,
            WeaponCategory::Melee => &self.melee,
        }
    }

    fn table_mut(&mut self, category: WeaponCategory) -> &mut BTreeMap<u32, CustomWeaponData> {
        match category {
            WeaponCategory::Gun => &mut self.guns,
            WeaponCategory::Melee => &mut self.melee,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weapon_core::StatMod;

    fn data(id: u32, category: WeaponCategory) -> CustomWeaponData {
        let properties: PropertyList =
            std::iter::once(Box::new(StatMod::damage().with_modifier(1.5)) as Box<dyn WeaponProperty>)
                .collect();
        CustomWeaponData::new(id, category, properties)
    }

    #[test]
    fn categories_keep_separate_id_spaces() {
        let mut catalog = WeaponCatalog::new();
        assert!(catalog.insert(data(7, WeaponCategory::Gun)).is_none());
        assert!(catalog.insert(data(7, WeaponCategory::Melee)).is_none());
        assert!(catalog.insert(data(7, WeaponCategory::Gun)).is_some());

        assert_eq!(catalog.len(), 2);
        assert!(catalog.gun(7).is_some());
        assert!(catalog.melee(7).is_some());
        assert!(catalog.gun(8).is_none());
    }

    #[test]
    fn instantiate_hands_out_fresh_copies() {
        let entry = data(1, WeaponCategory::Gun);
        let first = entry.instantiate();
        let second = entry.instantiate();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(first[0].kind(), "DamageMod");
    }

    #[test]
    fn document_lists_guns_before_melee() {
        let mut catalog = WeaponCatalog::new();
        catalog.insert(data(3, WeaponCategory::Melee));
        catalog.insert(data(9, WeaponCategory::Gun).with_name("Bulldog"));

        let document = catalog.to_document();
        let weapons = document["Weapons"].as_array().unwrap();
        assert_eq!(weapons[0]["ArchetypeID"], 9);
        assert_eq!(weapons[0]["Name"], "Bulldog");
        assert_eq!(weapons[1]["Category"], "Melee");
        assert_eq!(weapons[1]["Properties"][0]["Name"], "DamageMod");
    }
}
