//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod order;
pub mod status;
pub mod version;

use anyhow::Result;
use clap::Subcommand;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::cli::output::OutputConfig;
use crate::core::builder::FailurePolicy;
use crate::core::global_config::GlobalConfig;
use crate::core::graph::DependencyGraph;
use crate::core::recipe::BuildUnit;
use crate::error::CiError;
use crate::infra::discovery::discover_units;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build every recipe in dependency order and publish to a channel
    Build {
        /// Directory containing one sub-directory per recipe
        recipe_dir: PathBuf,

        /// Account that owns the published packages
        owner: String,

        /// Target channel
        #[arg(long, env = "CHANNELCI_CHANNEL")]
        channel: Option<String>,

        /// Platform subdir used in artifact names (e.g. linux-64)
        #[arg(long)]
        subdir: Option<String>,

        /// Registry API base URL
        #[arg(long, env = "CHANNELCI_API_URL")]
        api_url: Option<String>,

        /// conda executable
        #[arg(long, env = "CHANNELCI_CONDA")]
        conda: Option<String>,

        /// What to do when a build fails
        #[arg(long, value_enum)]
        on_failure: Option<FailurePolicy>,

        /// Publishing token; without one nothing is uploaded
        #[arg(long, env = "BINSTAR_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Print the resolved build order
    Order {
        /// Directory containing one sub-directory per recipe
        recipe_dir: PathBuf,
    },

    /// Show the registry status of every recipe
    Status {
        /// Directory containing one sub-directory per recipe
        recipe_dir: PathBuf,

        /// Account that owns the published packages
        owner: String,

        /// Target channel
        #[arg(long, env = "CHANNELCI_CHANNEL")]
        channel: Option<String>,

        /// Platform subdir used in artifact names (e.g. linux-64)
        #[arg(long)]
        subdir: Option<String>,

        /// Registry API base URL
        #[arg(long, env = "CHANNELCI_API_URL")]
        api_url: Option<String>,

        /// Registry token, needed to see a private owner's files
        #[arg(long, env = "BINSTAR_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Rewrite a recipe's version from a `__version__` declaration
    ///
    /// In a git checkout the branch name is appended as `<version>.<branch>`.
    /// Characters conda rejects in versions become `_`, so branch
    /// `feature/x-y` is appended as `feature_x_y`.
    SubstituteVersion {
        /// Recipe directory containing meta.yaml
        recipe_dir: PathBuf,

        /// File containing a Python `__version__ = '...'` declaration
        version_file: PathBuf,

        /// Do not append the current git branch name (`-` and `/` in it become `_`)
        #[arg(long)]
        without_branch_name: bool,
    },
}

impl Commands {
    /// Execute the command
    pub async fn run(self, output: OutputConfig, config: &GlobalConfig) -> Result<()> {
        match self {
            Self::Build {
                recipe_dir,
                owner,
                channel,
                subdir,
                api_url,
                conda,
                on_failure,
                token,
            } => {
                let options = build::BuildOptions {
                    owner,
                    channel: channel.unwrap_or_else(|| config.channel().to_string()),
                    subdir: subdir.unwrap_or_else(|| config.subdir()),
                    api_url: api_url.unwrap_or_else(|| config.api_url().to_string()),
                    conda: conda.unwrap_or_else(|| config.conda().to_string()),
                    failure_policy: on_failure.unwrap_or_else(|| config.failure_policy()),
                    token,
                };
                build::execute(&recipe_dir, options, output).await
            }
            Self::Order { recipe_dir } => order::execute(&recipe_dir, output),
            Self::Status {
                recipe_dir,
                owner,
                channel,
                subdir,
                api_url,
                token,
            } => {
                let options = status::StatusOptions {
                    owner,
                    channel: channel.unwrap_or_else(|| config.channel().to_string()),
                    subdir: subdir.unwrap_or_else(|| config.subdir()),
                    api_url: api_url.unwrap_or_else(|| config.api_url().to_string()),
                    token,
                };
                status::execute(&recipe_dir, options, output).await
            }
            Self::SubstituteVersion {
                recipe_dir,
                version_file,
                without_branch_name,
            } => version::execute(&recipe_dir, &version_file, !without_branch_name, output),
        }
    }
}

/// Discover the recipes under `recipe_dir` and return them in build order
pub fn ordered_units(recipe_dir: &Path) -> Result<(DependencyGraph, Vec<BuildUnit>), CiError> {
    let units = discover_units(recipe_dir)?;
    let graph = DependencyGraph::build_graph(&units)?;
    let order = graph.topological_sort()?;

    let mut by_name: HashMap<String, BuildUnit> =
        units.into_iter().map(|u| (u.name.clone(), u)).collect();
    let ordered = order.iter().filter_map(|name| by_name.remove(name)).collect();
    Ok((graph, ordered))
}
