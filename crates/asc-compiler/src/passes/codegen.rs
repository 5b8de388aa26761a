//! Code generation.
//!
//! Units with their own emitter generate into it; units sharing the main
//! emitter generate into that. In per-unit output mode each compiled unit's
//! emitter is flushed and written to `<stem>.abc` right after generation.

use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use asc_core::{Diagnostic, Emitter, ScopeKind, UnitId};
use asc_registry::{CompilationUnit, UnitEmitter, UnitOrigin, UnitPhases, UnitRegistry};

use super::is_generatable;
use crate::output::{unit_output_path, write_file};
use crate::{CompilerOptions, OutputMode, Toolchain};

/// Output of code generation.
#[derive(Debug, Default)]
pub struct CodegenOutput {
    pub generated: usize,
    /// Per-unit bytecode files written.
    pub written: Vec<PathBuf>,
    pub write_failures: usize,
}

/// Generates code for every generatable unit not generated yet.
pub struct CodegenPass<'a, T: Toolchain> {
    registry: &'a mut UnitRegistry<T::Emitter>,
    toolchain: &'a mut T,
    main_emitter: Option<&'a mut T::Emitter>,
    options: &'a CompilerOptions,
}

impl<'a, T: Toolchain> CodegenPass<'a, T> {
    pub fn new(
        registry: &'a mut UnitRegistry<T::Emitter>,
        toolchain: &'a mut T,
        main_emitter: Option<&'a mut T::Emitter>,
        options: &'a CompilerOptions,
    ) -> Self {
        Self {
            registry,
            toolchain,
            main_emitter,
            options,
        }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(self) -> CodegenOutput {
        let CodegenPass {
            registry,
            toolchain,
            mut main_emitter,
            options,
        } = self;
        let mut output = CodegenOutput::default();

        if options.api_versioning {
            if let Some(main) = main_emitter.as_deref_mut() {
                main.enable_api_versioning();
            }
        }

        for index in 0..registry.len() {
            let id = UnitId::from(index);
            let unit = &mut registry[id];
            if unit.phases.contains(UnitPhases::GENERATED) || !is_generatable(unit) {
                continue;
            }

            let CompilationUnit {
                context,
                program,
                emitter,
                phases,
                ..
            } = &mut *unit;
            let Some(program) = program.as_mut() else {
                continue;
            };
            let target = match emitter {
                UnitEmitter::Owned(emitter) => emitter,
                UnitEmitter::Shared => match main_emitter.as_deref_mut() {
                    Some(main) => main,
                    None => {
                        warn!(unit = %id, "shared emitter requested without a main emitter");
                        continue;
                    }
                },
                UnitEmitter::Flushed => continue,
            };

            context.enter_scope(ScopeKind::UnitFrame);
            toolchain.generate_code(context, program, target);
            context.exit_scope();
            *phases |= UnitPhases::GENERATED;
            output.generated += 1;

            if options.output == OutputMode::PerUnit && unit.origin != UnitOrigin::Imported {
                write_unit(unit, options, &mut output);
            }
        }

        debug!(
            generated = output.generated,
            written = output.written.len(),
            "code generation"
        );
        output
    }
}

fn write_unit<E: Emitter>(
    unit: &mut CompilationUnit<E>,
    options: &CompilerOptions,
    output: &mut CodegenOutput,
) {
    if unit.has_errors() {
        return;
    }
    let Some(emitter) = unit.emitter.flush() else {
        return;
    };
    let mut bytes = Vec::new();
    emitter.emit(&mut bytes);

    let path = unit_output_path(unit.path(), options.output_dir.as_deref());
    match write_file(&path, &bytes) {
        Ok(()) => {
            info!("{}: {}", unit.file_name(), bytes.len());
            unit.phases |= UnitPhases::EMITTED;
            output.written.push(path);
        }
        Err(err) => {
            error!("{}", err);
            let file = unit.file_name().to_string();
            unit.context
                .diagnostics
                .add(Diagnostic::error(err.to_string()).in_file(file));
            output.write_failures += 1;
        }
    }
}
