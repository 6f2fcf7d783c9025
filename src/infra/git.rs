//! Git operations
//!
//! Branch lookup for recipe version suffixes, using the gix crate.

use std::path::Path;

use crate::error::VersionError;

/// Short name of the branch checked out in the repository containing `path`
///
/// Returns `None` when `HEAD` is detached.
pub fn current_branch(path: &Path) -> Result<Option<String>, VersionError> {
    let repo = gix::discover(path).map_err(|e| VersionError::Git {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    let head = repo.head_name().map_err(|e| VersionError::Git {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    let branch = head.map(|name| name.shorten().to_string());
    tracing::debug!("Branch at {}: {branch:?}", path.display());
    Ok(branch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_not_a_repository() {
        let temp = TempDir::new().unwrap();
        let err = current_branch(temp.path()).unwrap_err();
        assert!(matches!(err, VersionError::Git { .. }));
    }

    #[test]
    fn test_fresh_repository_reports_branch() {
        let temp = TempDir::new().unwrap();
        gix::init(temp.path()).unwrap();

        let nested = temp.path().join("recipe");
        std::fs::create_dir(&nested).unwrap();

        let branch = current_branch(&nested).unwrap();
        assert!(branch.is_some_and(|b| !b.is_empty() && !b.starts_with("refs/")));
    }
}
