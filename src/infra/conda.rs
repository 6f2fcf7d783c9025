//! conda-build invocation
//!
//! Production [`PackageBuilder`]: runs `conda build` on a recipe directory and
//! asks conda where the package landed.

use std::path::PathBuf;
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::defaults::{self, ANACONDA_TOKEN_ENV, TOKEN_ENV};
use crate::core::builder::PackageBuilder;
use crate::core::recipe::BuildUnit;
use crate::error::BuildError;

/// Builds recipes with the `conda` executable
#[derive(Debug, Clone)]
pub struct CondaBuilder {
    conda: PathBuf,
}

impl CondaBuilder {
    /// Use the given `conda` executable (name on PATH or full path)
    pub fn new(conda: impl Into<PathBuf>) -> Self {
        Self {
            conda: conda.into(),
        }
    }

    /// The configured executable
    pub fn conda(&self) -> &PathBuf {
        &self.conda
    }

    fn command(&self, unit: &BuildUnit) -> Command {
        let mut cmd = Command::new(&self.conda);
        cmd.arg("build").arg(&unit.recipe_dir);
        strip_tokens(&mut cmd);
        cmd
    }

    async fn run(&self, unit: &BuildUnit, mut cmd: Command) -> Result<Output, BuildError> {
        let output = cmd.output().await.map_err(|e| BuildError::BuildFailed {
            unit: unit.name.clone(),
            error: format!("failed to run '{}': {e}", self.conda.display()),
        })?;

        if output.status.success() {
            Ok(output)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(BuildError::BuildFailed {
                unit: unit.name.clone(),
                error: format!("{} ({})", output.status, stderr.trim()),
            })
        }
    }
}

/// Keep registry credentials out of recipe build scripts
fn strip_tokens(cmd: &mut Command) -> &mut Command {
    cmd.env_remove(TOKEN_ENV).env_remove(ANACONDA_TOKEN_ENV)
}

impl Default for CondaBuilder {
    fn default() -> Self {
        Self::new(defaults::DEFAULT_CONDA)
    }
}

#[async_trait]
impl PackageBuilder for CondaBuilder {
    async fn build(&self, unit: &BuildUnit) -> Result<PathBuf, BuildError> {
        if which::which(&self.conda).is_err() {
            return Err(BuildError::ToolNotFound {
                tool: self.conda.display().to_string(),
            });
        }

        tracing::info!("Building {} from {}", unit.dist(), unit.recipe_dir.display());
        self.run(unit, self.command(unit)).await?;

        let mut locate = self.command(unit);
        locate.arg("--output");
        let output = self.run(unit, locate).await?;

        // conda may print log lines first; the path is the last line
        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = stdout
            .lines()
            .map(str::trim)
            .rev()
            .find(|line| !line.is_empty())
            .map(PathBuf::from)
            .unwrap_or_default();

        if path.as_os_str().is_empty() || !path.is_file() {
            return Err(BuildError::MissingOutput {
                unit: unit.name.clone(),
                path,
            });
        }

        tracing::debug!("Built {}", path.display());
        Ok(path)
    }
}
