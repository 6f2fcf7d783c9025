//! In-memory test doubles
//!
//! [`MemoryRegistry`] and [`RecordingBuilder`] satisfy the [`Registry`] and
//! [`PackageBuilder`] contracts without network or conda, and count every
//! call so tests can assert on side effects.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::core::builder::PackageBuilder;
use crate::core::recipe::{Artifact, BuildUnit};
use crate::error::{BuildError, PublishError, RegistryError};
use crate::registry::Registry;

/// Calls observed by a [`MemoryRegistry`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryCalls {
    /// Number of `exists` queries
    pub exists: usize,
    /// Number of channel listings
    pub channel_listings: usize,
    /// Uploaded basenames with their channels
    pub uploads: Vec<(String, Vec<String>)>,
    /// Linked basenames with their channel
    pub links: Vec<(String, String)>,
}

#[derive(Debug, Default)]
struct RegistryState {
    /// owner -> basenames
    dists: HashMap<String, HashSet<String>>,
    /// (owner, channel) -> basenames
    channels: HashMap<(String, String), HashSet<String>>,
    failing_uploads: HashSet<String>,
    failing_links: HashSet<String>,
    unavailable: bool,
    calls: RegistryCalls,
}

/// In-memory registry backed by hash maps
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    state: Mutex<RegistryState>,
}

impl MemoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, RegistryState> {
        lock(&self.state)
    }

    /// Seed an artifact as already published on the given channels
    pub fn publish(&self, owner: &str, artifact: &Artifact, channels: &[&str]) {
        let mut state = self.state();
        state
            .dists
            .entry(owner.to_string())
            .or_default()
            .insert(artifact.basename.clone());
        for channel in channels {
            state
                .channels
                .entry((owner.to_string(), (*channel).to_string()))
                .or_default()
                .insert(artifact.basename.clone());
        }
    }

    /// Make uploads of this unit fail
    pub fn fail_upload(&self, name: &str) {
        self.state().failing_uploads.insert(name.to_string());
    }

    /// Make links of this unit fail
    pub fn fail_link(&self, name: &str) {
        self.state().failing_links.insert(name.to_string());
    }

    /// Make every read query fail
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state().unavailable = unavailable;
    }

    /// Snapshot of the calls seen so far
    pub fn calls(&self) -> RegistryCalls {
        self.state().calls.clone()
    }

    /// Reset call counters, keeping contents
    pub fn reset_calls(&self) {
        self.state().calls = RegistryCalls::default();
    }

    /// Whether `basename` is on `owner`'s `channel`
    pub fn on_channel(&self, owner: &str, channel: &str, basename: &str) -> bool {
        self.state()
            .channels
            .get(&(owner.to_string(), channel.to_string()))
            .is_some_and(|files| files.contains(basename))
    }
}

fn unavailable(url: &str) -> RegistryError {
    RegistryError::Status {
        url: url.to_string(),
        status: 503,
    }
}

#[async_trait]
impl Registry for MemoryRegistry {
    async fn exists(&self, owner: &str, artifact: &Artifact) -> Result<bool, RegistryError> {
        let mut state = self.state();
        state.calls.exists += 1;
        if state.unavailable {
            return Err(unavailable(&format!("memory://dist/{owner}")));
        }
        Ok(state
            .dists
            .get(owner)
            .is_some_and(|files| files.contains(&artifact.basename)))
    }

    async fn channel_files(
        &self,
        owner: &str,
        channel: &str,
    ) -> Result<HashSet<String>, RegistryError> {
        let mut state = self.state();
        state.calls.channel_listings += 1;
        if state.unavailable {
            return Err(unavailable(&format!("memory://channels/{owner}/{channel}")));
        }
        Ok(state
            .channels
            .get(&(owner.to_string(), channel.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn upload(
        &self,
        artifact: &Artifact,
        owner: &str,
        channels: &[String],
    ) -> Result<(), PublishError> {
        let mut state = self.state();
        state
            .calls
            .uploads
            .push((artifact.basename.clone(), channels.to_vec()));
        if state.failing_uploads.contains(&artifact.name) {
            return Err(PublishError::UploadFailed {
                artifact: artifact.basename.clone(),
                channel: channels.join(","),
                error: "injected failure".to_string(),
            });
        }
        state
            .dists
            .entry(owner.to_string())
            .or_default()
            .insert(artifact.basename.clone());
        for channel in channels {
            state
                .channels
                .entry((owner.to_string(), channel.clone()))
                .or_default()
                .insert(artifact.basename.clone());
        }
        Ok(())
    }

    async fn link(
        &self,
        owner: &str,
        artifact: &Artifact,
        channel: &str,
    ) -> Result<(), PublishError> {
        let mut state = self.state();
        state
            .calls
            .links
            .push((artifact.basename.clone(), channel.to_string()));
        if state.failing_links.contains(&artifact.name) {
            return Err(PublishError::LinkFailed {
                artifact: artifact.basename.clone(),
                channel: channel.to_string(),
                error: "injected failure".to_string(),
            });
        }
        state
            .channels
            .entry((owner.to_string(), channel.to_string()))
            .or_default()
            .insert(artifact.basename.clone());
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Builder that records which units it was asked to build
#[derive(Debug, Default)]
pub struct RecordingBuilder {
    built: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingBuilder {
    /// Create a builder where every build succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the build of this unit fail
    pub fn fail(&self, name: &str) {
        lock(&self.failing).insert(name.to_string());
    }

    /// Names built so far, in call order
    pub fn built(&self) -> Vec<String> {
        lock(&self.built).clone()
    }
}

#[async_trait]
impl PackageBuilder for RecordingBuilder {
    async fn build(&self, unit: &BuildUnit) -> Result<PathBuf, BuildError> {
        lock(&self.built).push(unit.name.clone());
        if lock(&self.failing).contains(&unit.name) {
            return Err(BuildError::BuildFailed {
                unit: unit.name.clone(),
                error: "injected failure".to_string(),
            });
        }
        Ok(PathBuf::from("fake-build").join(format!("{}.tar.bz2", unit.dist())))
    }
}
