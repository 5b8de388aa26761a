//! Parse pass: turn newly registered units into program trees.

use std::fs;
use std::ops::Range;

use tracing::debug;

use asc_core::{CompileError, UnitId};
use asc_registry::{UnitPhases, UnitRegistry};

use crate::{CompilerOptions, DriverMode, Toolchain};

/// Output of the parse pass.
#[derive(Debug, Default)]
pub struct ParseOutput {
    /// Units parsed by this run.
    pub parsed: usize,
    /// Parsed units that are precompiled bytecode, in order.
    pub bytecode_inputs: Vec<UnitId>,
    /// Parsed units whose context reported errors.
    pub failed: Vec<UnitId>,
}

/// Parses every unit of a range that has not been parsed yet.
pub struct ParsePass<'a, T: Toolchain> {
    registry: &'a mut UnitRegistry<T::Emitter>,
    toolchain: &'a mut T,
    options: &'a CompilerOptions,
}

impl<'a, T: Toolchain> ParsePass<'a, T> {
    pub fn new(
        registry: &'a mut UnitRegistry<T::Emitter>,
        toolchain: &'a mut T,
        options: &'a CompilerOptions,
    ) -> Self {
        Self {
            registry,
            toolchain,
            options,
        }
    }

    /// Parse units in `range`.
    ///
    /// Reading a unit's file is the one failure that aborts the batch.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(self, range: Range<usize>) -> Result<ParseOutput, CompileError> {
        let mut output = ParseOutput::default();

        for index in range {
            let id = UnitId::from(index);
            let unit = &mut self.registry[id];
            if unit.phases.contains(UnitPhases::PARSED) {
                continue;
            }

            let path = unit.path().to_path_buf();
            unit.context.bind_file(&path);
            unit.context.config_vars = self.options.config_vars.clone();
            unit.context.use_namespaces = self.options.use_namespaces.clone();
            unit.context.debug = self.options.debug;
            unit.context.strict = self.options.strict;

            let mut program = if unit.is_source() {
                let source =
                    fs::read_to_string(&path).map_err(|err| CompileError::io(&path, err))?;
                self.toolchain
                    .parse_source(&mut unit.context, &path, &source)
            } else {
                let bytes = fs::read(&path).map_err(|err| CompileError::io(&path, err))?;
                output.bytecode_inputs.push(id);
                self.toolchain
                    .parse_bytecode(&mut unit.context, &path, &bytes)
            };

            unit.context.clear_parse_scratch();

            if self.options.mode == DriverMode::Script {
                self.toolchain
                    .evaluate_configuration(&mut unit.context, &mut program);
            }

            debug!(unit = %id, file = unit.file_name(), errors = unit.error_count(), "parsed");
            if unit.has_errors() {
                output.failed.push(id);
            }
            unit.program = Some(program);
            unit.phases |= UnitPhases::PARSED;
            output.parsed += 1;
        }

        Ok(output)
    }
}
