//! Weapon catalogs and engine tuning loaded from data files.
//!
//! - Weapon catalogs (JSON, see [`loaders::WeaponLoader`])
//! - Engine tuning (TOML, see [`loaders::ConfigLoader`])
//!
//! Malformed entries never abort a load. They are dropped with a warning so
//! one bad weapon cannot take the rest of the catalog down with it.

pub mod catalog;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use catalog::{CustomWeaponData, WeaponCatalog};

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, LoadResult, WeaponLoader};
