//! xtask subcommands

mod inspect_weapons;
mod simulate;

pub use inspect_weapons::InspectWeapons;
pub use simulate::Simulate;
