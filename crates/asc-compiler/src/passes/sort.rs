//! Inheritance sort: link inherited slots, then put every unit after the
//! units it inherits from.
//!
//! ```text
//!   unprocessed inheritance edges ──link slots──▶ processed
//!                 │
//!                 ▼
//!   graph (vertex per unit path, edge dependent → dependency)
//!                 │
//!        ┌────────┴─────────┐
//!   complete order      cycle found
//!        │                  │
//!   reindex registry    report "<path> in circular reference",
//!   and all edge sets   keep the current order
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use asc_core::{CompileError, Diagnostic, Diagnostics, RegistryError, UnitId};
use asc_registry::{DependencyGraph, EdgeSet, Permutation, UnitRegistry, reindex};

use super::link_pending;

/// Output of the inheritance sort.
#[derive(Debug, Default)]
pub struct SortOutput {
    /// Inheritance edges whose slots were linked by this run.
    pub slots_linked: usize,
    /// Whether the registry was renumbered.
    pub reordered: bool,
    /// Units on or behind an inheritance cycle, in registry order.
    pub circular: Vec<PathBuf>,
}

/// Graph vertex key of a unit: its path, or its id when the path is not UTF-8.
///
/// Canonical paths are absolute, so an id key never collides with a path key.
fn vertex_key(id: UnitId, path: &Path) -> String {
    match path.to_str() {
        Some(path) => path.to_string(),
        None => format!("#{}", id),
    }
}

/// Topologically orders the registry by inheritance.
pub struct SortPass<'a, E> {
    registry: &'a mut UnitRegistry<E>,
    inheritance: &'a mut EdgeSet,
    others: Vec<&'a mut EdgeSet>,
    diagnostics: &'a mut Diagnostics,
    reported: &'a [PathBuf],
}

impl<'a, E> SortPass<'a, E> {
    /// `others` are renumbered alongside `inheritance` when the order changes.
    pub fn new(
        registry: &'a mut UnitRegistry<E>,
        inheritance: &'a mut EdgeSet,
        others: Vec<&'a mut EdgeSet>,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            registry,
            inheritance,
            others,
            diagnostics,
            reported: &[],
        }
    }

    /// Cycle members already diagnosed by an earlier sort of the same run.
    pub fn already_reported(mut self, reported: &'a [PathBuf]) -> Self {
        self.reported = reported;
        self
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(self) -> Result<SortOutput, CompileError> {
        let SortPass {
            registry,
            inheritance,
            mut others,
            diagnostics,
            reported,
        } = self;

        let (slots_linked, _) = link_pending(registry, inheritance, None);

        let mut graph = DependencyGraph::new();
        let keys: Vec<String> = registry
            .iter()
            .map(|(id, unit)| {
                let key = vertex_key(id, unit.path());
                graph.add_vertex(key.clone(), id);
                key
            })
            .collect();
        for edge in inheritance.iter() {
            graph.add_dependency(
                &keys[edge.dependent.as_usize()],
                &keys[edge.dependency.as_usize()],
            );
        }

        let sorted = graph.topological_order();
        let mut output = SortOutput {
            slots_linked,
            ..Default::default()
        };

        if !sorted.is_complete() {
            let mut cyclic = sorted.cyclic;
            cyclic.sort_unstable();
            for id in cyclic {
                let unit = &registry[id];
                if !reported.iter().any(|path| path == unit.path()) {
                    let message = format!("{} in circular reference", unit.path().display());
                    warn!("{}", message);
                    diagnostics.add(Diagnostic::warning(message).in_file(unit.file_name()));
                }
                output.circular.push(unit.path().to_path_buf());
            }
            return Ok(output);
        }

        let expected = registry.len();
        let actual = sorted.order.len();
        let permutation = Permutation::new(sorted.order)
            .ok_or(RegistryError::PermutationLength { expected, actual })?;
        output.reordered = !permutation.is_identity();

        let mut edge_sets: Vec<&mut EdgeSet> = Vec::with_capacity(others.len() + 1);
        edge_sets.push(inheritance);
        edge_sets.extend(others.iter_mut().map(|edges| &mut **edges));
        reindex(registry, &mut edge_sets, &permutation)?;

        debug!(
            units = expected,
            reordered = output.reordered,
            slots_linked,
            "inheritance sort"
        );
        Ok(output)
    }
}
