//! Error types for channelci
//!
//! Domain-specific error types using thiserror.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use thiserror::Error;

/// Recipe discovery errors
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Recipe root does not exist or is not a directory
    #[error("Recipe directory not found: {path}")]
    RootNotFound { path: PathBuf },

    /// Failed to read a recipe directory or file
    #[error("IO error for '{path}': {error}")]
    IoError { path: PathBuf, error: String },

    /// `meta.yaml` could not be parsed
    #[error("Invalid recipe at '{path}': {error}")]
    InvalidRecipe { path: PathBuf, error: String },
}

/// Dependency resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    /// Two discovered units share a name
    #[error("Duplicate build unit '{name}'")]
    DuplicateUnit { name: String },

    /// A dependency is not part of the graph at all
    #[error("Missing dependency: '{dependency}' required by '{package}'")]
    MissingDependency { package: String, dependency: String },

    /// Residual cyclic or unsatisfiable subgraph
    #[error("Dependencies could not be resolved. Remaining dependencies: {}", format_remaining(remaining))]
    UnresolvableDependencies {
        remaining: BTreeMap<String, BTreeSet<String>>,
    },
}

fn format_remaining(remaining: &BTreeMap<String, BTreeSet<String>>) -> String {
    remaining
        .iter()
        .map(|(name, deps)| {
            let deps: Vec<&str> = deps.iter().map(String::as_str).collect();
            format!("{name} -> [{}]", deps.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Build errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Build tool exited unsuccessfully
    #[error("Build failed for '{unit}': {error}")]
    BuildFailed { unit: String, error: String },

    /// Build tool not found on PATH
    #[error("Build tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// Build succeeded but no package file was produced
    #[error("Build of '{unit}' did not produce '{path}'")]
    MissingOutput { unit: String, path: PathBuf },
}

/// Read-side registry errors
///
/// "Not found" is never one of these: it is reported as a negative result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Transport-level failure
    #[error("Registry request to '{url}' failed: {error}")]
    Network { url: String, error: String },

    /// Unexpected HTTP status
    #[error("Registry returned HTTP {status} for '{url}'")]
    Status { url: String, status: u16 },

    /// Response body could not be decoded
    #[error("Invalid registry response from '{url}': {error}")]
    InvalidResponse { url: String, error: String },
}

/// Write-side registry errors
///
/// Messages never contain the publishing token; use [`PublishError::redacted`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// Upload of a freshly built artifact failed
    #[error("Upload of '{artifact}' to channel '{channel}' failed: {error}")]
    UploadFailed {
        artifact: String,
        channel: String,
        error: String,
    },

    /// Adding an existing artifact to a channel failed
    #[error("Linking '{artifact}' to channel '{channel}' failed: {error}")]
    LinkFailed {
        artifact: String,
        channel: String,
        error: String,
    },

    /// Channel membership could not be determined before publishing
    #[error("Could not inspect channel '{channel}': {error}")]
    ChannelQuery { channel: String, error: String },
}

impl PublishError {
    /// Replace every occurrence of `secret` in `message` with `***`
    pub fn redacted(message: &str, secret: Option<&str>) -> String {
        match secret {
            Some(secret) if !secret.is_empty() => message.replace(secret, "***"),
            _ => message.to_string(),
        }
    }
}

/// Configuration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    ReadError { path: PathBuf, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    ParseError { path: PathBuf, error: String },
}

/// Recipe version substitution errors
#[derive(Error, Debug)]
pub enum VersionError {
    /// The version file has no `__version__` declaration
    #[error("No __version__ declaration found in '{path}'")]
    NoVersion { path: PathBuf },

    /// `meta.yaml` has no `version:` line
    #[error("No 'version:' line found in '{path}'")]
    NoVersionLine { path: PathBuf },

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    /// Git repository inspection failed
    #[error("Git error for '{path}': {error}")]
    Git { path: PathBuf, error: String },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },
}

/// Run-level failures reported by the orchestrator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    /// Graph could not be ordered; nothing was built
    #[error(transparent)]
    Resolver(#[from] ResolverError),

    /// Registry could not be queried while classifying units
    #[error("Could not determine publication state of '{unit}': {source}")]
    Classify {
        unit: String,
        #[source]
        source: RegistryError,
    },

    /// A build failed and the run was aborted
    #[error(transparent)]
    Build(#[from] BuildError),

    /// One or more units failed to build under the skip-dependents policy
    #[error("{} unit(s) failed to build: {}", units.len(), units.join(", "))]
    BuildsFailed { units: Vec<String> },

    /// One or more publish steps failed
    #[error("{} unit(s) failed to publish: {}", units.len(), units.join(", "))]
    PublishFailed { units: Vec<String> },
}

/// Top-level channelci error type
#[derive(Error, Debug)]
pub enum CiError {
    /// Discovery error
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Build order could not be determined
    #[error(transparent)]
    Resolver(#[from] ResolverError),

    /// Orchestration error
    #[error("{0}")]
    Orchestrator(#[from] OrchestratorError),

    /// Registry error
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Config error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Version substitution error
    #[error("Version error: {0}")]
    Version(#[from] VersionError),
}
