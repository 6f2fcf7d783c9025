//! Status command implementation
//!
//! Implements `channelci status`: classify every recipe against the registry
//! in build order. Read-only.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use super::ordered_units;
use crate::cli::output::{self, status, OutputConfig};
use crate::core::capability::PublishCapability;
use crate::core::publication::{PublicationState, PublicationStatus};
use crate::core::recipe::Artifact;
use crate::registry::AnacondaClient;

/// Status options
#[derive(Debug)]
pub struct StatusOptions {
    /// Account that owns the published packages
    pub owner: String,
    /// Channel to check
    pub channel: String,
    /// Platform subdir
    pub subdir: String,
    /// Registry API base URL
    pub api_url: String,
    /// Registry token, needed to see a private owner's files
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
struct StatusEntry {
    name: String,
    basename: String,
    status: PublicationStatus,
}

/// Execute the status command
pub async fn execute(recipe_dir: &Path, options: StatusOptions, out: OutputConfig) -> Result<()> {
    let (_, units) = ordered_units(recipe_dir)?;

    let capability = PublishCapability::from_token(options.token);
    let registry = AnacondaClient::with_url(&options.api_url, capability.token().map(str::to_string));
    let mut state = PublicationState::new(&registry, &options.owner);

    let mut entries = Vec::with_capacity(units.len());
    for unit in &units {
        let artifact = Artifact::for_unit(unit, &options.subdir);
        let publication = state
            .classify(&artifact, &options.channel)
            .await
            .with_context(|| format!("Failed to query the registry for {artifact}"))?;
        entries.push(StatusEntry {
            name: unit.name.clone(),
            basename: artifact.basename,
            status: publication,
        });
    }

    if out.json {
        output::print_json(&entries)?;
    } else if !out.quiet {
        for entry in &entries {
            let prefix = match entry.status {
                PublicationStatus::BuiltOnChannel => status::SUCCESS,
                PublicationStatus::BuiltNotOnChannel => status::INFO,
                PublicationStatus::Unbuilt => status::WARNING,
            };
            println!("{prefix} {}: {}", entry.basename, entry.status);
        }
    }
    Ok(())
}
