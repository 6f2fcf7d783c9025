//! Substitute-version command implementation
//!
//! Implements `channelci substitute-version`: stamp a recipe's `meta.yaml`
//! with the version declared in a Python source file.

use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::output::{self, status, OutputConfig};
use crate::config::defaults::META_FILE;
use crate::core::version::{parse_version_declaration, substitute_version, versioned};
use crate::error::VersionError;
use crate::infra::{filesystem, git};

/// Execute the substitute-version command
pub fn execute(
    recipe_dir: &Path,
    version_file: &Path,
    with_branch: bool,
    out: OutputConfig,
) -> Result<()> {
    let declaration = filesystem::read_file(version_file).map_err(VersionError::from)?;
    let version = parse_version_declaration(&declaration).ok_or_else(|| {
        VersionError::NoVersion {
            path: version_file.to_path_buf(),
        }
    })?;

    let version = if with_branch {
        let branch = git::current_branch(recipe_dir)?;
        versioned(&version, branch.as_deref())
    } else {
        version
    };

    let meta_path = recipe_dir.join(META_FILE);
    let meta = filesystem::read_file(&meta_path).map_err(VersionError::from)?;
    let updated = substitute_version(&meta, &version)
        .ok_or_else(|| VersionError::NoVersionLine {
            path: meta_path.clone(),
        })?;
    filesystem::write_file(&meta_path, &updated).map_err(VersionError::from)?;

    tracing::info!("Set version of {} to {version}", meta_path.display());
    if out.json {
        output::print_json(&serde_json::json!({
            "recipe": meta_path,
            "version": version,
        }))
        .context("Failed to print result")?;
    } else if !out.quiet {
        println!("{} {}: version {version}", status::SUCCESS, meta_path.display());
    }
    Ok(())
}
