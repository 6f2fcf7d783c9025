//! Dependency resolution
//!
//! Computes a deterministic build order from a [`DependencyGraph`].
//!
//! Each pass walks the remaining packages in ascending name order and appends
//! every package whose dependencies are all complete, immediately, so a
//! package can unblock a later-sorted one within the same pass. Passes repeat
//! until nothing remains or a pass makes no progress.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::config::defaults::MAX_RESOLVE_PASSES;
use crate::core::graph::DependencyGraph;
use crate::error::ResolverError;

/// Resolve a graph into a build order
pub fn resolve(graph: &DependencyGraph) -> Result<Vec<String>, ResolverError> {
    // Unknown names can never complete; report them as typos, not cycles.
    for (package, deps) in graph.edges() {
        if let Some(dep) = deps.iter().find(|dep| !graph.contains(dep)) {
            return Err(ResolverError::MissingDependency {
                package: package.clone(),
                dependency: dep.clone(),
            });
        }
    }

    let mut remaining: BTreeMap<String, BTreeSet<String>> = graph.edges().clone();
    let mut completed: Vec<String> = Vec::with_capacity(remaining.len());
    let mut done: HashSet<String> = HashSet::with_capacity(remaining.len());

    for _ in 0..MAX_RESOLVE_PASSES {
        if remaining.is_empty() {
            break;
        }

        let candidates: Vec<String> = remaining.keys().cloned().collect();
        let mut progressed = false;
        for package in candidates {
            let ready = remaining
                .get(&package)
                .is_some_and(|deps| deps.iter().all(|dep| done.contains(dep)));
            if ready {
                remaining.remove(&package);
                done.insert(package.clone());
                completed.push(package);
                progressed = true;
            }
        }

        if !progressed {
            break;
        }
    }

    if remaining.is_empty() {
        tracing::debug!("Resolved build order: {}", completed.join(", "));
        Ok(completed)
    } else {
        Err(ResolverError::UnresolvableDependencies { remaining })
    }
}
