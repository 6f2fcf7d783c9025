//! Publication state of build units
//!
//! Read-only classification of artifacts against the registry. Existence is
//! global to the owner; channel membership is per channel and answered from a
//! full channel listing.

use serde::Serialize;

use crate::core::recipe::Artifact;
use crate::error::RegistryError;
use crate::registry::{ChannelCache, Registry};

/// Where an artifact stands on the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PublicationStatus {
    /// Not present under the owner at all
    Unbuilt,
    /// Present under the owner, but not on the target channel
    BuiltNotOnChannel,
    /// Present on the target channel
    BuiltOnChannel,
}

impl std::fmt::Display for PublicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unbuilt => write!(f, "unbuilt"),
            Self::BuiltNotOnChannel => write!(f, "built, not on channel"),
            Self::BuiltOnChannel => write!(f, "built, on channel"),
        }
    }
}

/// Registry queries scoped to one owner and one run
pub struct PublicationState<'a, R: Registry + ?Sized> {
    registry: &'a R,
    owner: String,
    channels: ChannelCache,
}

impl<'a, R: Registry + ?Sized> PublicationState<'a, R> {
    /// Create a fresh state; nothing is carried over between runs
    pub fn new(registry: &'a R, owner: &str) -> Self {
        Self {
            registry,
            owner: owner.to_string(),
            channels: ChannelCache::new(),
        }
    }

    /// Owner account being queried
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Whether the artifact exists anywhere under the owner
    pub async fn is_published(&self, artifact: &Artifact) -> Result<bool, RegistryError> {
        let exists = self.registry.exists(&self.owner, artifact).await?;
        tracing::debug!("{artifact} published under {}: {exists}", self.owner);
        Ok(exists)
    }

    /// Whether the artifact is listed on `channel`
    pub async fn is_on_channel(
        &mut self,
        artifact: &Artifact,
        channel: &str,
    ) -> Result<bool, RegistryError> {
        if self.channels.get(&self.owner, channel).is_none() {
            let files = self.registry.channel_files(&self.owner, channel).await?;
            tracing::debug!("Channel {}/{channel} lists {} files", self.owner, files.len());
            self.channels.insert(&self.owner, channel, files);
        }
        Ok(self
            .channels
            .get(&self.owner, channel)
            .is_some_and(|files| files.contains(&artifact.basename)))
    }

    /// Full classification against `channel`
    pub async fn classify(
        &mut self,
        artifact: &Artifact,
        channel: &str,
    ) -> Result<PublicationStatus, RegistryError> {
        if !self.is_published(artifact).await? {
            return Ok(PublicationStatus::Unbuilt);
        }
        if self.is_on_channel(artifact, channel).await? {
            Ok(PublicationStatus::BuiltOnChannel)
        } else {
            Ok(PublicationStatus::BuiltNotOnChannel)
        }
    }

    /// Note that this run put the artifact on `channel`
    pub fn record_on_channel(&mut self, artifact: &Artifact, channel: &str) {
        self.channels.record(&self.owner, channel, &artifact.basename);
    }
}
