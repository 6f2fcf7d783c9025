//! Core business logic module
//!
//! Build ordering, publication state and the orchestration loop. Network,
//! filesystem and process access live behind the [`crate::registry::Registry`]
//! and [`builder::PackageBuilder`] seams and in [`crate::infra`].
//!
//! # Submodules
//!
//! - [`recipe`] - Build units, recipe metadata and artifact identity
//! - [`graph`] - Intra-run dependency graph
//! - [`resolver`] - Deterministic build order
//! - [`publication`] - Registry classification of artifacts
//! - [`capability`] - Publishing capability
//! - [`builder`] - Build orchestration logic
//! - [`global_config`] - Global configuration management
//! - [`version`] - Recipe version substitution

pub mod builder;
pub mod capability;
pub mod global_config;
pub mod graph;
pub mod publication;
pub mod recipe;
pub mod resolver;
pub mod version;
