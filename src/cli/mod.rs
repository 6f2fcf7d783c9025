//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::core::global_config::GlobalConfig;
use crate::infra::dirs::CiDirs;
use commands::Commands;
use output::OutputConfig;

/// Version string for `--version`, with the build metadata from `build.rs`
const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_SHA"),
    ", ",
    env!("VERGEN_CARGO_TARGET_TRIPLE"),
    ")"
);

/// channelci - build conda recipes in dependency order and publish them
///
/// Builds only what the owner has not published yet and makes sure every
/// package ends up on the target channel.
#[derive(Parser, Debug)]
#[command(name = "channelci")]
#[command(author, version, long_version = LONG_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (default: config.toml in the config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Output settings derived from the global flags
    pub fn output(&self) -> OutputConfig {
        OutputConfig::new(self.quiet, self.json, self.verbose)
    }

    /// Load the configuration file named by `--config`, or the default one
    pub fn load_config(&self) -> Result<GlobalConfig> {
        let path = self
            .config
            .clone()
            .unwrap_or_else(|| CiDirs::new().global_config_path());
        tracing::debug!("Loading configuration from {}", path.display());
        GlobalConfig::load_from_path(&path).context("Failed to load configuration")
    }

    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        let output = self.output();
        let config = self.load_config()?;

        if let Some(cmd) = self.command {
            cmd.run(output, &config).await
        } else {
            // No subcommand provided, show help
            use clap::CommandFactory;
            let mut cmd = Self::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}
