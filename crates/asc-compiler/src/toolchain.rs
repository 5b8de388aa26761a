//! The external collaborators a session drives.
//!
//! Lexing, parsing, flow analysis, constant evaluation and code generation
//! live outside this crate. A [`Toolchain`] bundles them behind one seam so
//! the driver only orders their invocation.

use std::path::Path;

use asc_core::{ConstantEvaluator, Emitter, FlowAnalyzer, ProgramNode, UnitContext};

/// Parser, analyzers and code generator used for every unit of a session.
pub trait Toolchain {
    /// Emitter type units generate into.
    type Emitter: Emitter;

    /// A fresh emitter for the unit at `path` (or for merged output).
    fn create_emitter(&mut self, path: &Path) -> Self::Emitter;

    /// Parse `.as` source. Syntax errors go to `cx`, never out.
    fn parse_source(&mut self, cx: &mut UnitContext, path: &Path, source: &str) -> ProgramNode;

    /// Read a precompiled bytecode input into a program tree.
    fn parse_bytecode(&mut self, cx: &mut UnitContext, path: &Path, bytes: &[u8]) -> ProgramNode;

    /// Conditional-compilation pass, run right after parsing.
    fn evaluate_configuration(&mut self, cx: &mut UnitContext, program: &mut ProgramNode) {
        let _ = (cx, program);
    }

    /// Analyzer for one unit, created when its first pass runs.
    fn flow_analyzer(&mut self, cx: &UnitContext, path: &Path) -> Box<dyn FlowAnalyzer>;

    /// Metadata evaluation pass.
    fn evaluate_metadata(&mut self, cx: &mut UnitContext, program: &mut ProgramNode) {
        let _ = (cx, program);
    }

    fn constant_evaluator(&mut self, cx: &UnitContext) -> Box<dyn ConstantEvaluator>;

    /// Generate code for `program` into `emitter`.
    fn generate_code(
        &mut self,
        cx: &mut UnitContext,
        program: &mut ProgramNode,
        emitter: &mut Self::Emitter,
    );
}
