//! asc: a multi-pass batch compiler driver for ActionScript units.
//!
//! The crates behind this facade:
//!
//! - [`asc_core`]: Model types, diagnostics, errors and collaborator seams
//! - [`asc_registry`]: The unit arena, dependency edges and topological sort
//! - [`asc_compiler`]: Passes, the fixed-point driver, sessions and output
//!
//! Most callers only need the [`prelude`].

pub use asc_compiler as compiler;
pub use asc_core as core;
pub use asc_registry as registry;

pub mod prelude {
    pub use asc_compiler::{
        BatchSummary, BlockEmitter, BytecodeOptimizer, ClasspathResolver, CompilationSession,
        CompilerOptions, DriverMode, OutputError, OutputMode, Packager, ReferencePolicy,
        Toolchain, UnresolvedReport,
    };
    pub use asc_core::{
        AnalysisState, BindingKind, ClassDefinition, CompileError, ConstantEvaluator, Diagnostic,
        DiagnosticKind, Diagnostics, Emitter, FlowAnalyzer, Frame, Namespace, ProgramNode,
        QualifiedName, Slot, Span, UnitContext, UnitId, UnresolvedReference,
    };
    pub use asc_registry::{
        CompilationUnit, DependencyEdge, EdgeSet, UnitEmitter, UnitOrigin, UnitPhases,
        UnitRegistry,
    };
}
