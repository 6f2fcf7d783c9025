//! Order command implementation
//!
//! Implements `channelci order`: print the build order without touching the
//! registry or building anything.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use super::ordered_units;
use crate::cli::output::{self, OutputConfig};

#[derive(Debug, Serialize)]
struct OrderEntry<'a> {
    name: &'a str,
    version: &'a str,
    /// Dependencies within this run
    depends_on: Vec<&'a str>,
}

/// Execute the order command
pub fn execute(recipe_dir: &Path, out: OutputConfig) -> Result<()> {
    let (graph, units) = ordered_units(recipe_dir)?;

    let entries: Vec<OrderEntry<'_>> = units
        .iter()
        .map(|unit| OrderEntry {
            name: &unit.name,
            version: &unit.version,
            depends_on: graph
                .dependencies(&unit.name)
                .map(|deps| deps.iter().map(String::as_str).collect())
                .unwrap_or_default(),
        })
        .collect();

    if out.json {
        output::print_json(&entries)?;
    } else if !out.quiet {
        for (index, entry) in entries.iter().enumerate() {
            if entry.depends_on.is_empty() {
                println!("{:>3}. {} {}", index + 1, entry.name, entry.version);
            } else {
                println!(
                    "{:>3}. {} {} (after {})",
                    index + 1,
                    entry.name,
                    entry.version,
                    entry.depends_on.join(", ")
                );
            }
        }
    }
    Ok(())
}
