//! Compilation unit registry and dependency graph.
//!
//! ## Modules
//!
//! - [`registry`]: The unit arena, deduplicated by canonical path
//! - [`unit`]: Per-unit state
//! - [`edge`]: Deduplicated dependency edge sets
//! - [`permutation`]: Atomic reordering of units and edges
//! - [`graph`]: Cycle-tolerant topological ordering

pub mod edge;
pub mod graph;
pub mod permutation;
pub mod registry;
pub mod unit;

pub use edge::{DependencyEdge, EdgeSet};
pub use graph::{DependencyGraph, TopologicalOrder};
pub use permutation::{Permutation, reindex};
pub use registry::{Admission, UnitRegistry};
pub use unit::{
    BYTECODE_EXTENSION, CompilationUnit, SOURCE_EXTENSION, UnitEmitter, UnitOrigin, UnitPhases,
    is_source_path,
};
