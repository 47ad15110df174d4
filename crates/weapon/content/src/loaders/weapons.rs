//! Weapon catalog loader.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use weapon_core::{WeaponCategory, decode_list, normalize_key};

use crate::catalog::{CustomWeaponData, WeaponCatalog};
use crate::loaders::{LoadResult, read_file};

/// One `Weapons` entry before its property list is decoded.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WeaponEntry {
    #[serde(rename = "ArchetypeID", alias = "ArchetypeId", alias = "archetypeID", alias = "ID")]
    archetype_id: u32,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default, alias = "properties")]
    properties: Option<Value>,
}

/// Loader for weapon catalogs from JSON files.
///
/// ```json
/// { "Weapons": [ { "ArchetypeID": 12, "Name": "Bulldog", "Properties": [ ... ] } ] }
/// ```
///
/// A bare array of entries is accepted as well. Entries with a missing id and
/// property documents that fail to decode are skipped with a warning.
pub struct WeaponLoader;

impl WeaponLoader {
    pub fn load(path: &Path) -> LoadResult<WeaponCatalog> {
        let content = read_file(path)?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parses catalog text; `source` only labels log lines.
    pub fn parse(content: &str, source: &str) -> LoadResult<WeaponCatalog> {
        let document: Value = serde_json::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse weapon JSON {}: {}", source, e))?;

        let entries = match &document {
            Value::Array(entries) => entries.as_slice(),
            Value::Object(fields) => fields
                .iter()
                .find(|(key, _)| normalize_key(key) == "weapons")
                .and_then(|(_, value)| value.as_array())
                .map(Vec::as_slice)
                .ok_or_else(|| anyhow::anyhow!("{} has no Weapons array", source))?,
            _ => anyhow::bail!("{} must be an object or an array", source),
        };

        let mut catalog = WeaponCatalog::new();
        for (index, entry) in entries.iter().enumerate() {
            let Some(data) = Self::decode_entry(entry, source, index) else {
                continue;
            };
            let archetype_id = data.archetype_id;
            let category = data.category;
            if catalog.insert(data).is_some() {
                tracing::warn!(
                    target: "content::weapons",
                    source,
                    archetype_id,
                    %category,
                    "duplicate archetype id, later entry wins"
                );
            }
        }

        tracing::debug!(
            target: "content::weapons",
            source,
            weapons = catalog.len(),
            "loaded weapon catalog"
        );
        Ok(catalog)
    }

    fn decode_entry(entry: &Value, source: &str, index: usize) -> Option<CustomWeaponData> {
        let parsed = match WeaponEntry::deserialize(entry) {
            Ok(parsed) => parsed,
            Err(error) => {
                tracing::warn!(
                    target: "content::weapons",
                    source,
                    index,
                    %error,
                    "skipping malformed weapon entry"
                );
                return None;
            }
        };

        let category = match parsed.category.as_deref().map(normalize_key).as_deref() {
            Some("melee") => WeaponCategory::Melee,
            _ => WeaponCategory::Gun,
        };

        let properties = parsed.properties.unwrap_or(Value::Array(Vec::new()));
        let (list, errors) = decode_list(&properties);
        for error in &errors {
            tracing::warn!(
                target: "content::weapons",
                source,
                archetype_id = parsed.archetype_id,
                %error,
                "dropping property"
            );
        }

        let unsupported = list.iter().filter(|p| !p.supports(category)).count();
        if unsupported > 0 {
            tracing::debug!(
                target: "content::weapons",
                source,
                archetype_id = parsed.archetype_id,
                %category,
                unsupported,
                "properties will be skipped at registration"
            );
        }

        let mut data = CustomWeaponData::new(parsed.archetype_id, category, list);
        data.name = parsed.name;
        Some(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wrapped_and_bare_catalogs() {
        let wrapped = r#"{ "Weapons": [ { "ArchetypeID": 4, "Properties": [ { "Name": "AutoTrigger" } ] } ] }"#;
        let bare = r#"[ { "ArchetypeID": 4, "Category": "Melee" } ]"#;

        let catalog = WeaponLoader::parse(wrapped, "wrapped").unwrap();
        assert_eq!(catalog.gun(4).unwrap().properties.len(), 1);

        let catalog = WeaponLoader::parse(bare, "bare").unwrap();
        assert!(catalog.melee(4).unwrap().properties.is_empty());
    }

    #[test]
    fn bad_entries_are_dropped_not_fatal() {
        let content = r#"{
            "Weapons": [
                { "Name": "no id" },
                "not an object",
                {
                    "ArchetypeID": 2,
                    "Properties": [
                        { "Name": "Teleport" },
                        { "Name": "DamageMod", "Mod": 2 }
                    ]
                }
            ]
        }"#;
        let catalog = WeaponLoader::parse(content, "mixed").unwrap();
        assert_eq!(catalog.len(), 1);

        let data = catalog.gun(2).unwrap();
        let kinds: Vec<_> = data.properties.iter().map(|p| p.kind()).collect();
        assert_eq!(kinds, vec!["DamageMod"]);
    }

    #[test]
    fn malformed_files_are_errors() {
        assert!(WeaponLoader::parse("{", "truncated").is_err());
        assert!(WeaponLoader::parse("3", "scalar").is_err());
        assert!(WeaponLoader::parse(r#"{ "Guns": [] }"#, "wrong key").is_err());
    }
}
