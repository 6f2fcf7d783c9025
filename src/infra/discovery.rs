//! Recipe discovery
//!
//! Walks one level below a recipe root and turns every buildable recipe
//! directory into a [`BuildUnit`].

use std::path::Path;

use walkdir::WalkDir;

use crate::config::defaults::{BUILD_SCRIPT, META_FILE};
use crate::core::recipe::{BuildUnit, RecipeMeta};
use crate::error::DiscoveryError;

/// Discover build units under `root`, in directory-name order
///
/// Directories without a `meta.yaml` are not recipes. Recipes without the
/// platform build script are skipped.
pub fn discover_units(root: &Path) -> Result<Vec<BuildUnit>, DiscoveryError> {
    if !root.is_dir() {
        return Err(DiscoveryError::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut units = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| DiscoveryError::IoError {
            path: e.path().unwrap_or(root).to_path_buf(),
            error: e.to_string(),
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let recipe_dir = entry.path();
        let meta_path = recipe_dir.join(META_FILE);
        if !meta_path.is_file() {
            tracing::debug!("Skipping {}: no {META_FILE}", recipe_dir.display());
            continue;
        }
        if !recipe_dir.join(BUILD_SCRIPT).is_file() {
            tracing::debug!("Skipping {}: no {BUILD_SCRIPT}", recipe_dir.display());
            continue;
        }

        let unit = load_unit(recipe_dir, &meta_path)?;
        tracing::debug!(
            "Found recipe {} {} in {}",
            unit.name,
            unit.version,
            recipe_dir.display()
        );
        units.push(unit);
    }

    tracing::info!("Discovered {} recipe(s) in {}", units.len(), root.display());
    Ok(units)
}

fn load_unit(recipe_dir: &Path, meta_path: &Path) -> Result<BuildUnit, DiscoveryError> {
    let content = std::fs::read_to_string(meta_path).map_err(|e| DiscoveryError::IoError {
        path: meta_path.to_path_buf(),
        error: e.to_string(),
    })?;

    let meta = RecipeMeta::from_yaml(&content).map_err(|e| DiscoveryError::InvalidRecipe {
        path: recipe_dir.to_path_buf(),
        error: e.to_string(),
    })?;

    Ok(BuildUnit::from_meta(meta, recipe_dir.to_path_buf()))
}
