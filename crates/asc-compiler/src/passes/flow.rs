//! Flow analysis passes.
//!
//! ```text
//! First pass   state == Inheritance   fresh global scope   creates the analyzer
//!              (discovers base classes into fa_unresolved, moves state to Else)
//! Second pass  state == Else          unit's own frame     reuses the analyzer
//!              (runs after inherited slots are linked)
//! ```
//!
//! Units with errors are skipped by both passes.

use std::ops::Range;

use tracing::debug;

use asc_core::{AnalysisState, ScopeKind, UnitId};
use asc_registry::{UnitPhases, UnitRegistry};

use crate::Toolchain;

/// Which flow-analysis pass to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    First,
    Second,
}

impl FlowStage {
    fn state(self) -> AnalysisState {
        match self {
            FlowStage::First => AnalysisState::Inheritance,
            FlowStage::Second => AnalysisState::Else,
        }
    }

    fn phase(self) -> UnitPhases {
        match self {
            FlowStage::First => UnitPhases::FIRST_PASS,
            FlowStage::Second => UnitPhases::SECOND_PASS,
        }
    }

    fn scope(self) -> ScopeKind {
        match self {
            FlowStage::First => ScopeKind::Global,
            FlowStage::Second => ScopeKind::UnitFrame,
        }
    }
}

/// Output of a flow-analysis pass.
#[derive(Debug, Default)]
pub struct FlowOutput {
    pub analyzed: usize,
    /// Units in the expected state but without an analyzer (second pass only).
    pub without_analyzer: usize,
}

/// Runs one flow-analysis stage over a range of units.
pub struct FlowPass<'a, T: Toolchain> {
    registry: &'a mut UnitRegistry<T::Emitter>,
    toolchain: &'a mut T,
    stage: FlowStage,
}

impl<'a, T: Toolchain> FlowPass<'a, T> {
    pub fn new(
        registry: &'a mut UnitRegistry<T::Emitter>,
        toolchain: &'a mut T,
        stage: FlowStage,
    ) -> Self {
        Self {
            registry,
            toolchain,
            stage,
        }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(self, range: Range<usize>) -> FlowOutput {
        let mut output = FlowOutput::default();
        let stage = self.stage;

        for index in range {
            let id = UnitId::from(index);
            let unit = &mut self.registry[id];
            if unit.has_errors() || unit.phases.contains(stage.phase()) {
                continue;
            }
            let path = unit.path().to_path_buf();
            let Some(program) = unit.program.as_mut() else {
                continue;
            };
            if program.state != stage.state() {
                continue;
            }

            if stage == FlowStage::First {
                let analyzer = self.toolchain.flow_analyzer(&unit.context, &path);
                unit.analyzer = Some(analyzer);
            }
            let Some(analyzer) = unit.analyzer.as_mut() else {
                debug!(unit = %id, "no analyzer for second pass");
                output.without_analyzer += 1;
                continue;
            };

            unit.context.enter_scope(stage.scope());
            analyzer.analyze(&mut unit.context, program);
            unit.context.exit_scope();

            unit.phases |= stage.phase();
            output.analyzed += 1;
        }

        debug!(?stage, analyzed = output.analyzed, "flow analysis");
        output
    }
}
