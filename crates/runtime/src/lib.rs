//! Host-side glue for custom weapons.
//!
//! This crate wraps `weapon-core` registries into per-weapon components and
//! owns the services they share. Hosts drive it from their own event
//! callbacks and frame loop; nothing here spawns threads or performs I/O
//! beyond the initial content load.
//!
//! Modules are organized by responsibility:
//! - [`weapon`] hosts [`CustomWeapon`], the per-weapon component
//! - [`manager`] tracks live weapons and routes hits, kills and sync traffic
//! - [`kill_tracker`] attributes kills to the last hitting weapon
//! - [`sync`] defines the messages exchanged with remote peers
//! - [`config`] reads runtime settings from the environment
pub mod config;
pub mod error;
pub mod kill_tracker;
pub mod manager;
pub mod sync;
pub mod weapon;

pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use kill_tracker::KillTracker;
pub use manager::WeaponManager;
pub use sync::{SyncMessage, SyncPayload};
pub use weapon::{CustomWeapon, ShotTimers};
