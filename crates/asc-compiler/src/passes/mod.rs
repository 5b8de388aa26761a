//! Pipeline passes.
//!
//! - [`parse`]: Parse newly registered units
//! - [`flow`]: First (inheritance discovery) and second flow-analysis passes
//! - [`resolve`]: Drain unresolved-reference lists into dependency edges
//! - [`sort`]: Link inherited slots, then order units by inheritance
//! - [`import`]: Link slots along type and expression edges
//! - [`evaluate`]: Metadata and constant evaluation
//! - [`codegen`]: Code generation and per-unit output
//!
//! Every pass takes the registry by `&mut` for the duration of one `run`
//! and reports what it did through an output struct; none of them decides
//! whether the loop continues.

pub mod codegen;
pub mod evaluate;
pub mod flow;
pub mod import;
pub mod parse;
pub mod resolve;
pub mod sort;

pub use codegen::{CodegenOutput, CodegenPass};
pub use evaluate::{ConstantPass, EvaluateOutput, MetadataPass};
pub use flow::{FlowOutput, FlowPass, FlowStage};
pub use import::{ImportOutput, ImportPass};
pub use parse::{ParseOutput, ParsePass};
pub use resolve::{ResolveOutput, ResolvePass, UnresolvedReport};
pub use sort::{SortOutput, SortPass};

use tracing::debug;

use asc_core::UnitId;
use asc_registry::{CompilationUnit, EdgeSet, UnitRegistry};

/// Whether a unit may go through metadata, constant evaluation and code generation.
pub(crate) fn is_generatable<E>(unit: &CompilationUnit<E>) -> bool {
    !unit.has_errors() && unit.is_source() && unit.emitter.is_available() && unit.is_parsed()
}

/// Link the top-level slots of `dependency` into `dependent`.
///
/// Uses the dependent's analyzer when it has one, plain frame linking
/// otherwise. Returns `None` if either unit is not parsed yet.
pub(crate) fn link_slots<E>(
    registry: &mut UnitRegistry<E>,
    dependent: UnitId,
    dependency: UnitId,
) -> Option<usize> {
    let (dest, source) = registry.pair_mut(dependent, dependency)?;
    let source = &source.program.as_ref()?.frame;
    let CompilationUnit {
        analyzer,
        program,
        context,
        ..
    } = dest;
    let dest = &mut program.as_mut()?.frame;
    let linked = match analyzer {
        Some(analyzer) => analyzer.inherit_slots(source, dest, context),
        None => {
            debug!(unit = %dependent, "no analyzer; linking frame directly");
            dest.inherit_from(source)
        }
    };
    Some(linked)
}

/// Link every unprocessed edge of `edges` (skipping pairs also present in
/// `covered`) and mark it processed. Returns `(linked, skipped)`.
pub(crate) fn link_pending<E>(
    registry: &mut UnitRegistry<E>,
    edges: &mut EdgeSet,
    covered: Option<&EdgeSet>,
) -> (usize, usize) {
    let mut linked = 0;
    let mut skipped = 0;
    for edge in edges.unprocessed() {
        let already = covered.is_some_and(|c| c.contains(edge.dependent, edge.dependency));
        if already {
            skipped += 1;
        } else if link_slots(registry, edge.dependent, edge.dependency).is_some() {
            linked += 1;
        } else {
            // Not parsed yet; retried on a later pass.
            continue;
        }
        edges.mark_processed(edge.dependent, edge.dependency);
    }
    (linked, skipped)
}
