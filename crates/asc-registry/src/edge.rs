//! Dependency edges between units.

use rustc_hash::FxHashMap;

use asc_core::UnitId;

use crate::Permutation;

/// `dependent` needs something defined in `dependency`.
///
/// Identity is the ordered pair; `processed` is bookkeeping that records that
/// slots have already been linked along this edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyEdge {
    pub dependent: UnitId,
    pub dependency: UnitId,
    pub processed: bool,
}

impl DependencyEdge {
    pub fn key(&self) -> (UnitId, UnitId) {
        (self.dependent, self.dependency)
    }
}

/// Edges deduplicated by `(dependent, dependency)`, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct EdgeSet {
    edges: Vec<DependencyEdge>,
    index: FxHashMap<(UnitId, UnitId), usize>,
}

impl EdgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an unprocessed edge. Returns `false` if the pair was already present.
    pub fn insert(&mut self, dependent: UnitId, dependency: UnitId) -> bool {
        let key = (dependent, dependency);
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.edges.len());
        self.edges.push(DependencyEdge {
            dependent,
            dependency,
            processed: false,
        });
        true
    }

    pub fn contains(&self, dependent: UnitId, dependency: UnitId) -> bool {
        self.index.contains_key(&(dependent, dependency))
    }

    pub fn get(&self, dependent: UnitId, dependency: UnitId) -> Option<&DependencyEdge> {
        self.index
            .get(&(dependent, dependency))
            .map(|&at| &self.edges[at])
    }

    /// Mark an edge processed. Returns `false` if the edge does not exist.
    pub fn mark_processed(&mut self, dependent: UnitId, dependency: UnitId) -> bool {
        match self.index.get(&(dependent, dependency)) {
            Some(&at) => {
                self.edges[at].processed = true;
                true
            }
            None => false,
        }
    }

    /// Unprocessed edges, in insertion order.
    pub fn unprocessed(&self) -> Vec<DependencyEdge> {
        self.edges.iter().filter(|e| !e.processed).copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.edges.iter()
    }

    /// Dependencies recorded for `dependent`.
    pub fn dependencies_of(&self, dependent: UnitId) -> impl Iterator<Item = UnitId> + '_ {
        self.edges
            .iter()
            .filter(move |e| e.dependent == dependent)
            .map(|e| e.dependency)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn clear(&mut self) {
        self.edges.clear();
        self.index.clear();
    }

    /// Rewrite both ends of every edge into new coordinates.
    pub(crate) fn reindex(&mut self, permutation: &Permutation) {
        self.index.clear();
        for (at, edge) in self.edges.iter_mut().enumerate() {
            edge.dependent = permutation.new_index(edge.dependent);
            edge.dependency = permutation.new_index(edge.dependency);
            self.index.insert(edge.key(), at);
        }
    }
}
