//! Content factory for loading every weapon data file in a directory.

use std::path::{Path, PathBuf};

use weapon_core::EngineConfig;

use crate::catalog::WeaponCatalog;
use crate::loaders::{ConfigLoader, LoadResult, WeaponLoader};

/// Loads weapon content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── weapons.json
/// └── weapons/
///     ├── rifles.json
///     └── melee.json
/// ```
///
/// `weapons.json` is read first, then `weapons/*.json` in file name order;
/// later files override earlier entries with the same archetype id.
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load engine tuning from `config.toml`.
    pub fn load_config(&self) -> LoadResult<EngineConfig> {
        ConfigLoader::load(&self.data_dir.join("config.toml"))
    }

    /// Like [`load_config`](Self::load_config), but a missing file yields defaults.
    pub fn load_config_or_default(&self) -> LoadResult<EngineConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::debug!(
                target: "content::config",
                path = %path.display(),
                "no config file, using defaults"
            );
            return Ok(EngineConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load and merge every weapon catalog file.
    pub fn load_weapons(&self) -> LoadResult<WeaponCatalog> {
        let mut catalog = WeaponCatalog::new();
        for path in self.weapon_files()? {
            catalog.extend(WeaponLoader::load(&path)?);
        }
        Ok(catalog)
    }

    /// Catalog files in load order.
    pub fn weapon_files(&self) -> LoadResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        let root = self.data_dir.join("weapons.json");
        if root.is_file() {
            files.push(root);
        }

        let dir = self.data_dir.join("weapons");
        if dir.is_dir() {
            let mut nested = Vec::new();
            let entries = std::fs::read_dir(&dir)
                .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;
            for entry in entries {
                let path = entry?.path();
                if path.extension().is_some_and(|ext| ext == "json") {
                    nested.push(path);
                }
            }
            nested.sort();
            files.extend(nested);
        }

        Ok(files)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
