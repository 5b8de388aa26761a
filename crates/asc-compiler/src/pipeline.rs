//! The fixed-point driver.
//!
//! ```text
//!         ┌──────────────────────────────────────────────────────────┐
//!         ▼                                                          │
//!   parse [start,end) ─▶ first pass ─▶ resolve inheritance ── grew? ─┤
//!                                                  │ no              │
//!                                                  ▼                 │
//!          sort ─▶ second pass ─▶ resolve types ────────── grew? ────┤
//!                                                  │ no              │
//!                                                  ▼                 │
//!   batch:  import types ─▶ constants ─▶ codegen ─▶ resolve expressions
//!   script: import types ─▶ resolve expressions ─▶ import expressions
//!           ─▶ metadata ─▶ constants (two-phase) ─▶ codegen          │
//!                                                  │                 │
//!                                                  └──── grew? ──────┘
//! ```
//!
//! The registry only grows through classpath fallback during resolution.
//! After every resolution step the bound is re-read from the registry; the
//! loop ends once an iteration admits nothing. Classpath admission is
//! idempotent, so a finite classpath always reaches that point.

use std::ops::Range;
use std::path::PathBuf;

use tracing::{debug, trace};

use asc_core::{CompileError, Diagnostics, UnitId};
use asc_registry::{EdgeSet, UnitRegistry};

use crate::passes::{
    CodegenPass, ConstantPass, FlowPass, FlowStage, ImportPass, MetadataPass, ParsePass,
    ResolveOutput, ResolvePass, SortPass, UnresolvedReport,
};
use crate::{ClasspathResolver, CompilerOptions, DriverMode, Toolchain};

/// The three dependency edge sets of a session.
#[derive(Debug, Clone, Default)]
pub struct DependencyEdges {
    /// Base class and interface dependencies; drive the sort.
    pub inheritance: EdgeSet,
    /// Type annotation, body and namespace dependencies.
    pub types: EdgeSet,
    /// Runtime expression dependencies (script driver).
    pub expressions: EdgeSet,
}

impl DependencyEdges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.inheritance.clear();
        self.types.clear();
        self.expressions.clear();
    }
}

/// What one run of the driver did.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub iterations: usize,
    /// Units reported on an inheritance cycle.
    pub circular: Vec<PathBuf>,
    pub unresolved: Vec<UnresolvedReport>,
    /// Per-unit bytecode files written.
    pub written: Vec<PathBuf>,
}

impl PipelineReport {
    fn absorb(&mut self, resolved: ResolveOutput) {
        self.unresolved.extend(resolved.unresolved);
    }
}

/// Borrowed session state for one run of the driver.
pub struct Pipeline<'a, T: Toolchain> {
    pub registry: &'a mut UnitRegistry<T::Emitter>,
    pub toolchain: &'a mut T,
    pub edges: &'a mut DependencyEdges,
    pub classpath: &'a ClasspathResolver,
    pub options: &'a CompilerOptions,
    pub main_emitter: Option<&'a mut T::Emitter>,
    pub diagnostics: &'a mut Diagnostics,
}

impl<'a, T: Toolchain> Pipeline<'a, T> {
    /// Run until an iteration admits no new unit.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self) -> Result<PipelineReport, CompileError> {
        let mut report = PipelineReport::default();
        let mut start = 0;
        let mut end = self.registry.len();

        while start < end {
            report.iterations += 1;
            trace!(start, end, iteration = report.iterations, "pipeline iteration");

            self.discover(start..end, &mut report)?;
            (start, end) = (end, self.registry.len());
            if start < end {
                continue;
            }

            self.analyze(&mut report)?;
            (start, end) = (end, self.registry.len());
            if start < end {
                continue;
            }

            match self.options.mode {
                DriverMode::Batch => self.finish_batch(&mut report),
                DriverMode::Script => self.finish_script(&mut report),
            }
            (start, end) = (end, self.registry.len());
        }

        debug!(
            iterations = report.iterations,
            units = self.registry.len(),
            unresolved = report.unresolved.len(),
            "pipeline finished"
        );
        Ok(report)
    }

    /// Parse, first-pass and resolve inheritance for the units in `range`.
    fn discover(
        &mut self,
        range: Range<usize>,
        report: &mut PipelineReport,
    ) -> Result<(), CompileError> {
        let parsed =
            ParsePass::new(self.registry, self.toolchain, self.options).run(range.clone())?;
        FlowPass::new(self.registry, self.toolchain, FlowStage::First).run(range.clone());

        let resolved =
            self.with_resolver(|pass, edges| pass.inheritance(range, &mut edges.inheritance));
        report.absorb(resolved);

        if self.options.policy().link_binary_imports {
            link_binary_imports(&parsed.bytecode_inputs, &mut self.edges.inheritance);
        }
        Ok(())
    }

    /// Sort by inheritance, second-pass every unit and resolve type references.
    fn analyze(&mut self, report: &mut PipelineReport) -> Result<(), CompileError> {
        let DependencyEdges {
            inheritance,
            types,
            expressions,
        } = &mut *self.edges;
        let sorted = SortPass::new(
            self.registry,
            inheritance,
            vec![types, expressions],
            self.diagnostics,
        )
        .already_reported(&report.circular)
        .run()?;
        for path in sorted.circular {
            if !report.circular.contains(&path) {
                report.circular.push(path);
            }
        }

        let all = 0..self.registry.len();
        FlowPass::new(self.registry, self.toolchain, FlowStage::Second).run(all);

        let resolved = self.with_resolver(|pass, edges| pass.types(&mut edges.types));
        report.absorb(resolved);
        Ok(())
    }

    fn finish_batch(&mut self, report: &mut PipelineReport) {
        self.import_types();
        ConstantPass::new(self.registry, self.toolchain)
            .check_version(self.options.check_version)
            .run();
        self.generate(report);

        let resolved = self.with_resolver(|pass, edges| pass.expressions(&mut edges.expressions));
        report.absorb(resolved);
    }

    fn finish_script(&mut self, report: &mut PipelineReport) {
        self.import_types();

        let resolved = self.with_resolver(|pass, edges| pass.expressions(&mut edges.expressions));
        report.absorb(resolved);
        if self.options.policy().import_expression_bindings {
            ImportPass::new(
                self.registry,
                &mut self.edges.expressions,
                &self.edges.inheritance,
            )
            .run();
        }

        MetadataPass::new(self.registry, self.toolchain, self.options.check_version).run();
        ConstantPass::new(self.registry, self.toolchain)
            .two_phase(true)
            .check_version(self.options.check_version)
            .run();
        self.generate(report);
    }

    fn import_types(&mut self) {
        ImportPass::new(self.registry, &mut self.edges.types, &self.edges.inheritance).run();
    }

    fn generate(&mut self, report: &mut PipelineReport) {
        let main = self.main_emitter.as_deref_mut();
        let output = CodegenPass::new(self.registry, self.toolchain, main, self.options).run();
        report.written.extend(output.written);
    }

    fn with_resolver<R>(
        &mut self,
        f: impl FnOnce(&mut ResolvePass<'_, T>, &mut DependencyEdges) -> R,
    ) -> R {
        let mut pass = ResolvePass::new(
            self.registry,
            self.toolchain,
            self.classpath,
            self.options.policy(),
            self.diagnostics,
        );
        f(&mut pass, self.edges)
    }
}

/// Give every bytecode input an inheritance edge to each bytecode input
/// parsed before it in the same range, so imported definitions see each other.
pub fn link_binary_imports(bytecode_inputs: &[UnitId], inheritance: &mut EdgeSet) -> usize {
    let mut added = 0;
    for (at, &unit) in bytecode_inputs.iter().enumerate() {
        for &previous in &bytecode_inputs[..at] {
            if inheritance.insert(unit, previous) {
                added += 1;
            }
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_imports_see_earlier_imports() {
        let inputs = [UnitId::new(0), UnitId::new(2), UnitId::new(3)];
        let mut inheritance = EdgeSet::new();

        assert_eq!(link_binary_imports(&inputs, &mut inheritance), 3);
        let keys: Vec<_> = inheritance.iter().map(|e| e.key()).collect();
        assert_eq!(
            keys,
            vec![
                (UnitId::new(2), UnitId::new(0)),
                (UnitId::new(3), UnitId::new(0)),
                (UnitId::new(3), UnitId::new(2)),
            ]
        );
        assert_eq!(link_binary_imports(&inputs, &mut inheritance), 0);
    }

    #[test]
    fn edges_clear_together() {
        let mut edges = DependencyEdges::new();
        edges.inheritance.insert(UnitId::new(1), UnitId::new(0));
        edges.types.insert(UnitId::new(1), UnitId::new(0));
        edges.expressions.insert(UnitId::new(0), UnitId::new(1));
        edges.clear();
        assert!(edges.inheritance.is_empty());
        assert!(edges.types.is_empty());
        assert!(edges.expressions.is_empty());
    }
}
