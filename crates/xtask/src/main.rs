//! Development tasks for the weapon workspace
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod utils;

use anyhow::Result;
use clap::Parser;
use commands::{InspectWeapons, Simulate};

/// Development tasks for the weapon workspace
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for custom weapon content", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Load a weapon catalog and report what decoded
    InspectWeapons(InspectWeapons),

    /// Fire a scripted sequence through one weapon and print each shot
    Simulate(Simulate),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for WEAPON_DATA_DIR and other env vars)
    let _ = dotenvy::dotenv();
    utils::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::InspectWeapons(cmd) => cmd.execute(),
        Command::Simulate(cmd) => cmd.execute(),
    }
}
