//! Utility functions for xtask commands

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use weapon_runtime::RuntimeConfig;

/// Initializes logging from `RUST_LOG`, defaulting to warnings.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Runtime config from the environment, with `data_dir` overriding
/// `WEAPON_DATA_DIR` when given.
pub fn runtime_config(data_dir: Option<std::path::PathBuf>) -> Result<RuntimeConfig> {
    let mut config = RuntimeConfig::from_env().context("Invalid runtime environment")?;
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    if !config.data_dir.exists() {
        anyhow::bail!(
            "Data directory does not exist: {}\n\
             Set WEAPON_DATA_DIR or pass --data-dir.",
            config.data_dir.display()
        );
    }
    Ok(config)
}
