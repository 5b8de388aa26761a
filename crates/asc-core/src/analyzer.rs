//! Per-unit visitor seams driven by the pipeline.

use crate::{Frame, ProgramNode, UnitContext};

/// Flow analysis over a program.
///
/// The same analyzer instance runs both passes for a unit. The first pass
/// discovers inheritance references and must leave the program in
/// [`AnalysisState::Else`](crate::AnalysisState::Else); the second pass runs
/// once inheritance slots have been linked.
pub trait FlowAnalyzer {
    /// Run one analysis pass over `program`.
    fn analyze(&mut self, cx: &mut UnitContext, program: &mut ProgramNode);

    /// Link slots from `source` (another unit's top-level frame) into `dest`.
    ///
    /// Not required to be idempotent: the driver calls this at most once per
    /// dependency edge. Returns the number of bindings linked.
    fn inherit_slots(&mut self, source: &Frame, dest: &mut Frame, cx: &mut UnitContext) -> usize {
        let _ = cx;
        dest.inherit_from(source)
    }
}

/// Constant folding and type binding over a program.
pub trait ConstantEvaluator {
    /// Pre-declare definition types before any unit is evaluated.
    fn preprocess(&mut self, cx: &mut UnitContext, program: &mut ProgramNode) {
        let _ = (cx, program);
    }

    fn evaluate(&mut self, cx: &mut UnitContext, program: &mut ProgramNode);
}
