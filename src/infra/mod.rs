//! Infrastructure layer
//!
//! Handles filesystem, git and external process access.
//! Network access lives in [`crate::registry`].

pub mod conda;
pub mod dirs;
pub mod discovery;
pub mod filesystem;
pub mod git;
