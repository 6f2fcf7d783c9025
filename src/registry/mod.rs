//! Package registry access
//!
//! [`Registry`] is the seam between the orchestrator and the hosting service.
//! [`client::AnacondaClient`] talks to anaconda.org; [`crate::fakes`] holds
//! an in-memory double.

pub mod cache;
pub mod client;

use async_trait::async_trait;
use std::collections::HashSet;

use crate::core::recipe::Artifact;
use crate::error::{PublishError, RegistryError};

pub use cache::ChannelCache;
pub use client::AnacondaClient;

/// Operations the orchestrator needs from a package registry
#[async_trait]
pub trait Registry: Send + Sync {
    /// Whether the artifact exists anywhere under `owner`, regardless of channel
    ///
    /// A "not found" response is `Ok(false)`.
    async fn exists(&self, owner: &str, artifact: &Artifact) -> Result<bool, RegistryError>;

    /// Basenames of every file on `owner`'s `channel`
    ///
    /// A channel that does not exist yet is an empty set.
    async fn channel_files(&self, owner: &str, channel: &str)
        -> Result<HashSet<String>, RegistryError>;

    /// Upload a locally built artifact to the given channels
    async fn upload(
        &self,
        artifact: &Artifact,
        owner: &str,
        channels: &[String],
    ) -> Result<(), PublishError>;

    /// Add an already published artifact to `channel`
    async fn link(&self, owner: &str, artifact: &Artifact, channel: &str)
        -> Result<(), PublishError>;
}
