//! Build command implementation
//!
//! Implements `channelci build`: discover recipes, build what the owner has
//! not published yet, and put everything on the target channel.

use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::output::{self, status, OutputConfig};
use crate::core::builder::{BuildOrchestrator, FailurePolicy, OrchestratorConfig};
use crate::core::capability::PublishCapability;
use crate::infra::conda::CondaBuilder;
use crate::infra::discovery::discover_units;
use crate::registry::AnacondaClient;

/// Build options
#[derive(Debug)]
pub struct BuildOptions {
    /// Account that owns the published packages
    pub owner: String,
    /// Target channel
    pub channel: String,
    /// Platform subdir
    pub subdir: String,
    /// Registry API base URL
    pub api_url: String,
    /// conda executable
    pub conda: String,
    /// Build failure handling
    pub failure_policy: FailurePolicy,
    /// Publishing token
    pub token: Option<String>,
}

/// Execute the build command
pub async fn execute(recipe_dir: &Path, options: BuildOptions, out: OutputConfig) -> Result<()> {
    let units = discover_units(recipe_dir)
        .with_context(|| format!("Failed to discover recipes in {}", recipe_dir.display()))?;

    let capability = PublishCapability::from_token(options.token);
    let registry = AnacondaClient::with_url(&options.api_url, capability.token().map(str::to_string));
    let builder = CondaBuilder::new(&options.conda);

    tracing::info!(
        "Building {} recipe(s) for {}/{} ({})",
        units.len(),
        options.owner,
        options.channel,
        options.subdir
    );

    let config = OrchestratorConfig {
        owner: options.owner,
        channel: options.channel,
        subdir: options.subdir,
        capability,
        failure_policy: options.failure_policy,
    };
    let mut orchestrator = BuildOrchestrator::new(&builder, &registry, config);

    let bar = out.human().then(|| output::create_build_bar(units.len() as u64));
    if let Some(bar) = bar.clone() {
        orchestrator = orchestrator.with_progress(Box::new(move |index, _total, unit| {
            bar.set_position(index as u64);
            bar.set_message(unit.name.clone());
        }));
    }

    let result = orchestrator.run(&units).await;
    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }
    let report = result.context("Build run failed")?;

    if out.json {
        output::print_json(&report)?;
    } else if !out.quiet {
        output::print_report(&report);
    }

    report.ensure_success().context("Build run finished with failures")?;

    if out.human() {
        if orchestrator.config().capability.can_publish() {
            println!("{} All recipes are built and published", status::SUCCESS);
        } else {
            println!("{} All recipes are built (publishing disabled)", status::SUCCESS);
        }
    }
    Ok(())
}
