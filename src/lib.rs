//! channelci - build conda recipes in dependency order and publish them
//!
//! This library discovers conda recipes, orders them so every package is
//! built after its in-run dependencies, builds only what the owner has not
//! published yet, and makes sure every artifact ends up on the target
//! channel of an anaconda.org-style registry.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Ordering, publication state and orchestration (no direct I/O)
//! - [`registry`] - Registry client and channel listing cache
//! - [`infra`] - Infrastructure layer (filesystem, git, conda processes)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling
//! - [`fakes`] - In-memory registry and builder for tests

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod fakes;
pub mod infra;
pub mod registry;

#[cfg(test)]
pub mod test_utils;
