//! Channel listing cache
//!
//! The registry has no per-file channel lookup, so membership is answered by
//! listing the whole channel. Listings are kept for one run so units checked
//! against the same channel share a single request.

use std::collections::{HashMap, HashSet};

/// Per-run cache of channel file listings
#[derive(Debug, Default)]
pub struct ChannelCache {
    /// (owner, channel) -> basenames
    listings: HashMap<(String, String), HashSet<String>>,
}

impl ChannelCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached listing, if this channel has already been fetched
    pub fn get(&self, owner: &str, channel: &str) -> Option<&HashSet<String>> {
        self.listings.get(&(owner.to_string(), channel.to_string()))
    }

    /// Store a fetched listing
    pub fn insert(&mut self, owner: &str, channel: &str, files: HashSet<String>) {
        self.listings
            .insert((owner.to_string(), channel.to_string()), files);
    }

    /// Record that a file was added to a channel by this run
    pub fn record(&mut self, owner: &str, channel: &str, basename: &str) {
        if let Some(files) = self
            .listings
            .get_mut(&(owner.to_string(), channel.to_string()))
        {
            files.insert(basename.to_string());
        }
    }

    /// Number of cached channels
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}
