//! Inspect weapon catalogs
//!
//! Loads every catalog file in a data directory (or one file) and prints what
//! decoded, optionally checking that the catalog survives a codec round-trip.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use tracing::{debug, info};
use weapon_content::{ContentFactory, CustomWeaponData, WeaponCatalog, WeaponLoader};

use crate::utils;

/// Inspect weapon catalogs
#[derive(Parser)]
pub struct InspectWeapons {
    /// Single catalog file to read instead of a data directory
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Data directory (defaults to WEAPON_DATA_DIR)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "summary")]
    format: OutputFormat,

    /// Re-encode the catalog and fail if it does not decode identically
    #[arg(long)]
    verify: bool,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// One line per property
    Summary,
    /// Canonical catalog document
    Json,
}

impl InspectWeapons {
    pub fn execute(self) -> Result<()> {
        let catalog = match &self.file {
            Some(file) => {
                debug!(target: "xtask::inspect", file = %file.display(), "reading catalog file");
                WeaponLoader::load(file)?
            }
            None => {
                let config = utils::runtime_config(self.data_dir.clone())?;
                let factory = ContentFactory::new(&config.data_dir);
                println!(
                    "{} {}",
                    style("Data Directory:").bold().cyan(),
                    factory.data_dir().display()
                );
                for path in factory.weapon_files()? {
                    println!("  {} {}", style("•").dim(), path.display());
                }
                println!();
                factory.load_weapons()?
            }
        };
        info!(target: "xtask::inspect", weapons = catalog.len(), "catalog loaded");

        match self.format {
            OutputFormat::Summary => print_summary(&catalog),
            OutputFormat::Json => {
                let text = serde_json::to_string_pretty(&catalog.to_document())
                    .context("Failed to encode catalog")?;
                println!("{text}");
            }
        }

        if self.verify {
            verify_round_trip(&catalog)?;
        }
        Ok(())
    }
}

fn print_summary(catalog: &WeaponCatalog) {
    println!("{}", style("=== Weapon Catalog ===").bold().green());
    println!("Weapons: {}", catalog.len());
    println!();

    for data in catalog.iter() {
        print_weapon(data);
    }
}

fn print_weapon(data: &CustomWeaponData) {
    let name = data.name.as_deref().unwrap_or("<unnamed>");
    println!(
        "{} {} {} ({})",
        style(data.category).bold().yellow(),
        style(data.archetype_id).bold(),
        name,
        data.properties.len()
    );

    for property in data.properties.iter() {
        let kinds: Vec<_> = property.contexts().kinds().map(|k| k.to_string()).collect();
        let trigger = if property.trigger().is_some() {
            style("triggered").magenta().to_string()
        } else {
            style("permanent").dim().to_string()
        };
        let support = if property.supports(data.category) {
            String::new()
        } else {
            format!(" {}", style("unsupported, skipped at registration").red())
        };
        println!(
            "  {:<12} {:<10} [{}]{}",
            property.kind(),
            trigger,
            kinds.join(", "),
            support
        );
    }
    println!();
}

fn verify_round_trip(catalog: &WeaponCatalog) -> Result<()> {
    let document = catalog.to_document();
    let reparsed = WeaponLoader::parse(&document.to_string(), "re-encoded catalog")?;
    let again = reparsed.to_document();
    debug!(target: "xtask::inspect", weapons = reparsed.len(), "catalog re-decoded");

    if again != document {
        let mismatched = catalog
            .iter()
            .filter(|data| {
                reparsed
                    .get(data.category, data.archetype_id)
                    .is_none_or(|other| other.to_document() != data.to_document())
            })
            .map(|data| data.archetype_id.to_string())
            .collect::<Vec<_>>();
        anyhow::bail!(
            "Round-trip changed {} weapon(s): {}",
            mismatched.len(),
            mismatched.join(", ")
        );
    }

    println!(
        "{} {} weapon(s) round-trip cleanly",
        style("✓").green().bold(),
        catalog.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_catalog_round_trips() {
        let command = InspectWeapons {
            file: None,
            data_dir: Some(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")),
            format: OutputFormat::Json,
            verify: true,
        };
        command.execute().unwrap();
    }
}
