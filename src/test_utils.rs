//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    use crate::core::graph::DependencyGraph;

    /// Generate a valid package name (lowercase alphanumeric with hyphens)
    pub fn package_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9-]{0,30}[a-z0-9]?".prop_filter("Name must not be empty", |s| !s.is_empty())
    }

    // Index order deliberately disagrees with name order.
    fn node_name(i: usize) -> String {
        format!("u{:02}", (i * 7) % 13)
    }

    /// Generate an acyclic graph of up to 12 nodes
    ///
    /// Node `i` may only depend on nodes with a lower index.
    pub fn acyclic_graph() -> impl Strategy<Value = DependencyGraph> {
        (1usize..=12)
            .prop_flat_map(|n| proptest::collection::vec(proptest::collection::vec(any::<bool>(), n), n))
            .prop_map(|matrix| {
                let mut graph = DependencyGraph::new();
                for (i, row) in matrix.iter().enumerate() {
                    let deps = row
                        .iter()
                        .take(i)
                        .enumerate()
                        .filter(|(_, edge)| **edge)
                        .map(|(j, _)| node_name(j));
                    graph.add_package(&node_name(i), deps);
                }
                graph
            })
    }

    /// Generate a graph guaranteed to contain at least one cycle
    pub fn cyclic_graph() -> impl Strategy<Value = DependencyGraph> {
        acyclic_graph()
            .prop_flat_map(|graph| {
                let n = graph.len();
                (Just(graph), 0..n, 0..n)
            })
            .prop_map(|(graph, i, j)| {
                let mut edges = graph.edges().clone();
                let (a, b) = (node_name(i), node_name(j));
                edges.entry(a.clone()).or_default().insert(b.clone());
                edges.entry(b).or_default().insert(a);
                DependencyGraph::from(edges)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_package_name_generator(name in package_name()) {
            prop_assert!(!name.is_empty());
            prop_assert!(name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        }

        #[test]
        fn test_acyclic_graph_edges_stay_inside(graph in acyclic_graph()) {
            for deps in graph.edges().values() {
                for dep in deps {
                    prop_assert!(graph.contains(dep));
                }
            }
        }
    }
}
