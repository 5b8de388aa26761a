//! Metadata and constant evaluation.
//!
//! Metadata and one-phase constant evaluation visit only generatable units
//! (parsed source, no errors, emitter still available). Two-phase constant
//! evaluation visits every parsed unit without errors, bytecode imports
//! included, so their definition types are declared before any source unit
//! is evaluated: every evaluator preprocesses its unit first, then units
//! that are still error-free are evaluated. All visits run inside the
//! unit's top-level frame.

use tracing::debug;

use asc_core::{ConstantEvaluator, ProgramNode, ScopeKind, UnitContext, UnitId};
use asc_registry::{CompilationUnit, UnitPhases, UnitRegistry};

use super::is_generatable;
use crate::Toolchain;

/// Output of an evaluation pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EvaluateOutput {
    pub evaluated: usize,
    /// Units passed over because they had errors.
    pub gated: usize,
}

/// Parsed and error-free, whatever its kind.
fn is_evaluable<E>(unit: &CompilationUnit<E>) -> bool {
    unit.is_parsed() && !unit.has_errors()
}

/// Which units of the registry are due for `phase`, counting gated ones.
fn due<E>(
    registry: &UnitRegistry<E>,
    phase: UnitPhases,
    eligible: fn(&CompilationUnit<E>) -> bool,
    gated: &mut usize,
) -> Vec<UnitId> {
    registry
        .iter()
        .filter(|(_, unit)| !unit.phases.contains(phase))
        .filter(|(_, unit)| {
            let ok = eligible(unit);
            if !ok && unit.is_parsed() && unit.has_errors() {
                *gated += 1;
            }
            ok
        })
        .map(|(id, _)| id)
        .collect()
}

/// Evaluates metadata annotations of every due unit.
pub struct MetadataPass<'a, T: Toolchain> {
    registry: &'a mut UnitRegistry<T::Emitter>,
    toolchain: &'a mut T,
    check_version: bool,
}

impl<'a, T: Toolchain> MetadataPass<'a, T> {
    pub fn new(
        registry: &'a mut UnitRegistry<T::Emitter>,
        toolchain: &'a mut T,
        check_version: bool,
    ) -> Self {
        Self {
            registry,
            toolchain,
            check_version,
        }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(self) -> EvaluateOutput {
        let mut output = EvaluateOutput::default();
        for id in due(
            self.registry,
            UnitPhases::METADATA,
            is_generatable,
            &mut output.gated,
        ) {
            let unit = &mut self.registry[id];
            let Some(program) = unit.program.as_mut() else {
                continue;
            };
            unit.context.check_version = self.check_version;
            unit.context.enter_scope(ScopeKind::UnitFrame);
            self.toolchain.evaluate_metadata(&mut unit.context, program);
            unit.context.exit_scope();
            unit.context.check_version = false;
            unit.phases |= UnitPhases::METADATA;
            output.evaluated += 1;
        }
        debug!(evaluated = output.evaluated, gated = output.gated, "metadata");
        output
    }
}

/// Runs a constant evaluator over every due unit.
pub struct ConstantPass<'a, T: Toolchain> {
    registry: &'a mut UnitRegistry<T::Emitter>,
    toolchain: &'a mut T,
    two_phase: bool,
    check_version: bool,
}

impl<'a, T: Toolchain> ConstantPass<'a, T> {
    pub fn new(registry: &'a mut UnitRegistry<T::Emitter>, toolchain: &'a mut T) -> Self {
        Self {
            registry,
            toolchain,
            two_phase: false,
            check_version: false,
        }
    }

    /// Preprocess every unit before evaluating any. Bytecode imports take part.
    pub fn two_phase(mut self, two_phase: bool) -> Self {
        self.two_phase = two_phase;
        self
    }

    pub fn check_version(mut self, check_version: bool) -> Self {
        self.check_version = check_version;
        self
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self) -> EvaluateOutput {
        let mut output = EvaluateOutput::default();
        let eligible: fn(&CompilationUnit<T::Emitter>) -> bool = if self.two_phase {
            is_evaluable
        } else {
            is_generatable
        };
        let ids = due(self.registry, UnitPhases::CONSTANTS, eligible, &mut output.gated);

        let mut evaluators: Vec<(UnitId, Box<dyn ConstantEvaluator>)> = ids
            .into_iter()
            .map(|id| (id, self.toolchain.constant_evaluator(&self.registry[id].context)))
            .collect();

        if self.two_phase {
            for (id, evaluator) in evaluators.iter_mut() {
                self.visit(*id, |cx, program| evaluator.preprocess(cx, program));
            }
        }

        for (id, evaluator) in evaluators.iter_mut() {
            if self.registry[*id].has_errors() {
                output.gated += 1;
                continue;
            }
            self.visit(*id, |cx, program| evaluator.evaluate(cx, program));
            self.registry[*id].phases |= UnitPhases::CONSTANTS;
            output.evaluated += 1;
        }

        debug!(
            evaluated = output.evaluated,
            gated = output.gated,
            two_phase = self.two_phase,
            "constant evaluation"
        );
        output
    }

    fn visit(
        &mut self,
        id: UnitId,
        f: impl FnOnce(&mut UnitContext, &mut ProgramNode),
    ) {
        let unit = &mut self.registry[id];
        let Some(program) = unit.program.as_mut() else {
            return;
        };
        unit.context.check_version = self.check_version;
        unit.context.enter_scope(ScopeKind::UnitFrame);
        f(&mut unit.context, program);
        unit.context.exit_scope();
        unit.context.check_version = false;
    }
}
