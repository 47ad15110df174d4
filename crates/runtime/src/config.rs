//! Runtime configuration.

use std::path::PathBuf;

use weapon_core::EngineConfig;

use crate::error::{Result, RuntimeError};

/// Host-level settings for the weapon runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Directory handed to [`weapon_content::ContentFactory`].
    pub data_dir: PathBuf,
    pub engine: EngineConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            engine: EngineConfig::default(),
        }
    }
}

impl RuntimeConfig {
    pub const DATA_DIR_VAR: &'static str = "WEAPON_DATA_DIR";
    pub const MAX_FIRE_RATE_VAR: &'static str = "WEAPON_MAX_FIRE_RATE";
    pub const MIN_SHOT_DELAY_VAR: &'static str = "WEAPON_MIN_SHOT_DELAY";

    /// Reads overrides from the process environment.
    ///
    /// Unset variables keep their defaults; values that do not parse as
    /// positive numbers are rejected.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(dir) = lookup(Self::DATA_DIR_VAR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(Self::MAX_FIRE_RATE_VAR) {
            config.engine.max_fire_rate = parse_positive(Self::MAX_FIRE_RATE_VAR, raw)?;
        }
        if let Some(raw) = lookup(Self::MIN_SHOT_DELAY_VAR) {
            config.engine.min_shot_delay = parse_positive(Self::MIN_SHOT_DELAY_VAR, raw)?;
        }

        Ok(config)
    }
}

fn parse_positive(key: &'static str, raw: String) -> Result<f32> {
    match raw.trim().parse::<f32>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(RuntimeError::InvalidEnv { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn unset_variables_keep_defaults() {
        let config = RuntimeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("WEAPON_DATA_DIR", "/srv/weapons"),
            ("WEAPON_MAX_FIRE_RATE", " 30 "),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/weapons"));
        assert_eq!(config.engine.max_fire_rate, 30.0);
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let error = RuntimeConfig::from_lookup(lookup(&[("WEAPON_MIN_SHOT_DELAY", "-2")]))
            .unwrap_err();
        assert!(matches!(
            error,
            RuntimeError::InvalidEnv { key: "WEAPON_MIN_SHOT_DELAY", .. }
        ));
    }
}
