//! Dependency graph over the buildable units of one run
//!
//! Edges only exist between units of the same run. Dependencies on packages
//! outside the run are assumed to be satisfied externally and are dropped.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::recipe::BuildUnit;
use crate::core::resolver;
use crate::error::ResolverError;

/// Mapping from unit name to the names it must be built after
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package with its dependencies verbatim
    ///
    /// No filtering happens here; a raw graph may reference names that are
    /// not keys, which [`resolver::resolve`] reports as missing.
    pub fn add_package<I, S>(&mut self, name: &str, dependencies: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edges.insert(
            name.to_string(),
            dependencies.into_iter().map(Into::into).collect(),
        );
    }

    /// Build the intra-run graph from discovered units
    pub fn build_graph(units: &[BuildUnit]) -> Result<Self, ResolverError> {
        let mut names = BTreeSet::new();
        for unit in units {
            if !names.insert(unit.name.as_str()) {
                return Err(ResolverError::DuplicateUnit {
                    name: unit.name.clone(),
                });
            }
        }

        let mut graph = Self::new();
        for unit in units {
            let deps = unit
                .declared_dependencies
                .iter()
                .filter(|dep| names.contains(dep.as_str()))
                .cloned();
            graph.add_package(&unit.name, deps);
        }
        Ok(graph)
    }

    /// Dependencies of a package, if it is in the graph
    pub fn dependencies(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.edges.get(name)
    }

    /// Whether the graph has a node with this name
    pub fn contains(&self, name: &str) -> bool {
        self.edges.contains_key(name)
    }

    /// Node names in ascending order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Underlying adjacency map
    pub fn edges(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.edges
    }

    /// Every node that depends on `name`, directly or transitively
    pub fn dependents_of(&self, name: &str) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        let mut frontier = vec![name.to_string()];
        while let Some(current) = frontier.pop() {
            for (pkg, deps) in &self.edges {
                if deps.contains(&current) && found.insert(pkg.clone()) {
                    frontier.push(pkg.clone());
                }
            }
        }
        found
    }

    /// Compute topological sort (build order)
    ///
    /// Returns packages in order such that dependencies come before dependents.
    pub fn topological_sort(&self) -> Result<Vec<String>, ResolverError> {
        resolver::resolve(self)
    }

    /// Check if the graph cannot be ordered
    pub fn has_cycle(&self) -> bool {
        matches!(
            self.topological_sort(),
            Err(ResolverError::UnresolvableDependencies { .. })
        )
    }
}

impl From<BTreeMap<String, BTreeSet<String>>> for DependencyGraph {
    fn from(edges: BTreeMap<String, BTreeSet<String>>) -> Self {
        Self { edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_dependencies_are_dropped() {
        let units = vec![
            BuildUnit::new("app", "1.0").with_dependencies(["lib", "python", "zlib"]),
            BuildUnit::new("lib", "1.0").with_dependencies(["python"]),
        ];
        let graph = DependencyGraph::build_graph(&units).unwrap();

        assert_eq!(graph.len(), 2);
        let app: Vec<&str> = graph.dependencies("app").unwrap().iter().map(String::as_str).collect();
        assert_eq!(app, vec!["lib"]);
        assert!(graph.dependencies("lib").unwrap().is_empty());
        assert!(!graph.contains("python"));
    }

    #[test]
    fn test_duplicate_unit_rejected() {
        let units = vec![BuildUnit::new("a", "1.0"), BuildUnit::new("a", "2.0")];
        let err = DependencyGraph::build_graph(&units).unwrap_err();
        assert_eq!(
            err,
            ResolverError::DuplicateUnit {
                name: "a".to_string()
            }
        );
    }

    #[test]
    fn test_every_edge_targets_a_key() {
        let units = vec![
            BuildUnit::new("a", "1").with_dependencies(["b", "x"]),
            BuildUnit::new("b", "1").with_dependencies(["y"]),
            BuildUnit::new("c", "1").with_dependencies(["a", "b"]),
        ];
        let graph = DependencyGraph::build_graph(&units).unwrap();
        for deps in graph.edges().values() {
            for dep in deps {
                assert!(graph.contains(dep), "edge to unknown node {dep}");
            }
        }
    }

    #[test]
    fn test_dependents_of_is_transitive() {
        let mut graph = DependencyGraph::new();
        graph.add_package("a", ["b"]);
        graph.add_package("b", ["c"]);
        graph.add_package("c", Vec::<String>::new());
        graph.add_package("d", Vec::<String>::new());

        let dependents: Vec<String> = graph.dependents_of("c").into_iter().collect();
        assert_eq!(dependents, vec!["a".to_string(), "b".to_string()]);
        assert!(graph.dependents_of("a").is_empty());
    }

    #[test]
    fn test_simple_dependency_order() {
        let mut graph = DependencyGraph::new();
        graph.add_package("app", ["lib"]);
        graph.add_package("lib", Vec::<String>::new());

        let order = graph.topological_sort().unwrap();
        assert_eq!(order, vec!["lib", "app"]);
    }

    #[test]
    fn test_circular_dependency_detection() {
        let mut graph = DependencyGraph::new();
        graph.add_package("a", ["b"]);
        graph.add_package("b", ["c"]);
        graph.add_package("c", ["a"]);

        assert!(graph.has_cycle());
        assert!(graph.topological_sort().is_err());
    }
}
