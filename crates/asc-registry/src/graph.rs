//! Dependency graph over compilation units.
//!
//! Uses `petgraph::DiGraph` with:
//! - Nodes: `(path, UnitId)`; the path is the vertex identity
//! - Edges: dependent -> dependency
//!
//! ## Ordering
//!
//! ```text
//! A.as extends B.as, C.as extends A.as
//!
//!   A ──► B        order: B, A, C
//!   ▲
//!   C
//! ```
//!
//! A vertex is visited once every vertex it depends on has been visited
//! (Kahn's algorithm, seeded in vertex insertion order). Vertices on or
//! behind a cycle are never visited; they are reported instead of failing.

use std::collections::VecDeque;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;

use asc_core::UnitId;

/// Result of a cycle-tolerant topological visit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologicalOrder {
    /// Visited units, dependencies first.
    pub order: Vec<UnitId>,
    /// Units never visited, in insertion order.
    pub cyclic: Vec<UnitId>,
}

impl TopologicalOrder {
    /// Whether every vertex was visited.
    pub fn is_complete(&self) -> bool {
        self.cyclic.is_empty()
    }
}

/// Directed graph keyed by unit path.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<(String, UnitId), ()>,
    vertices: FxHashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex for `path` weighted with `unit`. An existing vertex is kept.
    pub fn add_vertex(&mut self, path: impl Into<String>, unit: UnitId) -> NodeIndex {
        let path = path.into();
        if let Some(&node) = self.vertices.get(&path) {
            return node;
        }
        let node = self.graph.add_node((path.clone(), unit));
        self.vertices.insert(path, node);
        node
    }

    pub fn contains_vertex(&self, path: &str) -> bool {
        self.vertices.contains_key(path)
    }

    /// Unit weight of a vertex.
    pub fn get(&self, path: &str) -> Option<UnitId> {
        self.vertices.get(path).map(|&node| self.graph[node].1)
    }

    /// Record that `dependent` depends on `dependency`.
    ///
    /// Both vertices must already exist; returns `false` otherwise.
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str) -> bool {
        match (self.vertices.get(dependent), self.vertices.get(dependency)) {
            (Some(&from), Some(&to)) => {
                self.graph.update_edge(from, to, ());
                true
            }
            _ => false,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Visit every vertex after all of its dependencies.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn topological_order(&self) -> TopologicalOrder {
        let mut pending: Vec<usize> = self
            .graph
            .node_indices()
            .map(|node| self.graph.edges_directed(node, Direction::Outgoing).count())
            .collect();

        let mut queue: VecDeque<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|node| pending[node.index()] == 0)
            .collect();

        let mut visited = vec![false; self.graph.node_count()];
        let mut order = Vec::with_capacity(self.graph.node_count());

        while let Some(node) = queue.pop_front() {
            visited[node.index()] = true;
            order.push(self.graph[node].1);

            let mut dependents: Vec<NodeIndex> = self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .collect();
            dependents.sort_unstable();
            for dependent in dependents {
                pending[dependent.index()] -= 1;
                if pending[dependent.index()] == 0 {
                    queue.push_back(dependent);
                }
            }
        }

        let cyclic = self
            .graph
            .node_indices()
            .filter(|node| !visited[node.index()])
            .map(|node| self.graph[node].1)
            .collect();

        TopologicalOrder { order, cyclic }
    }
}
