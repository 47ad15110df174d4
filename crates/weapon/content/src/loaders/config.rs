//! Engine tuning loader.

use std::path::Path;

use weapon_core::EngineConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`EngineConfig`] from TOML files.
///
/// Missing keys keep their defaults:
///
/// ```toml
/// min_shot_delay = 0.001
/// max_fire_rate = 1000.0
/// ```
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: &Path) -> LoadResult<EngineConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<EngineConfig> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.min_shot_delay <= 0.0 || config.max_fire_rate <= 0.0 {
            anyhow::bail!(
                "Config limits must be positive (min_shot_delay = {}, max_fire_rate = {})",
                config.min_shot_delay,
                config.max_fire_rate
            );
        }
        Ok(config)
    }
}
