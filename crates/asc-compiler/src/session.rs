//! Compilation sessions.
//!
//! A [`CompilationSession`] owns everything one batch compile touches: the
//! unit registry, the edge sets, the classpath, the toolchain and the merged
//! emitter. Nothing is process-wide, so independent sessions can coexist and
//! a long-lived host can [`clear`](CompilationSession::clear) and reuse one.
//!
//! # Example
//!
//! ```ignore
//! let options = CompilerOptions::default().with_classpath(["src"]);
//! let mut session = CompilationSession::new(options, toolchain)?;
//! session.add_file("src/A.as");
//! session.add_file("src/B.as");
//! let summary = session.run()?;
//! assert!(summary.unresolved.is_empty());
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use asc_core::{CompileError, Diagnostic, Diagnostics, UnitId};
use asc_registry::{UnitEmitter, UnitOrigin, UnitRegistry};

use crate::output::{self, BytecodeOptimizer, MergedTarget, Packager};
use crate::passes::UnresolvedReport;
use crate::pipeline::{DependencyEdges, Pipeline};
use crate::{ClasspathResolver, CompilerOptions, OutputMode, Toolchain};

/// What a batch compile produced.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Units in the registry at the end, including classpath discoveries.
    pub files: usize,
    pub elapsed: Duration,
    /// Files written, in write order.
    pub outputs: Vec<PathBuf>,
    /// Units reported on an inheritance cycle.
    pub circular: Vec<PathBuf>,
    pub unresolved: Vec<UnresolvedReport>,
    /// Error count of every unit, in final registry order.
    pub error_counts: Vec<(PathBuf, usize)>,
}

impl BatchSummary {
    pub fn total_errors(&self) -> usize {
        self.error_counts.iter().map(|(_, count)| count).sum()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors() > 0
    }

    /// Error count of the unit at `path`, if it was part of the batch.
    pub fn errors_in(&self, path: &Path) -> Option<usize> {
        self.error_counts
            .iter()
            .find(|(unit, _)| unit == path)
            .map(|&(_, count)| count)
    }
}

/// All state for compiling one batch of units.
pub struct CompilationSession<T: Toolchain> {
    options: CompilerOptions,
    toolchain: T,
    registry: UnitRegistry<T::Emitter>,
    edges: DependencyEdges,
    classpath: ClasspathResolver,
    main_emitter: Option<T::Emitter>,
    last_main: Option<PathBuf>,
    diagnostics: Diagnostics,
    optimizer: Option<Box<dyn BytecodeOptimizer>>,
    packager: Option<Box<dyn Packager>>,
}

impl<T: Toolchain> CompilationSession<T> {
    /// Create a session. Fails if the options are inconsistent.
    pub fn new(options: CompilerOptions, toolchain: T) -> Result<Self, CompileError> {
        options.validate()?;
        let classpath = ClasspathResolver::new(options.classpath.clone());
        Ok(Self {
            options,
            toolchain,
            registry: UnitRegistry::new(),
            edges: DependencyEdges::new(),
            classpath,
            main_emitter: None,
            last_main: None,
            diagnostics: Diagnostics::new(),
            optimizer: None,
            packager: None,
        })
    }

    /// Add a file to compile. Files that do not exist are skipped with a warning.
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Option<UnitId> {
        self.add(path.as_ref(), UnitOrigin::CommandLine)
    }

    /// Add a file whose definitions are visible but which is never written.
    pub fn add_import(&mut self, path: impl AsRef<Path>) -> Option<UnitId> {
        self.add(path.as_ref(), UnitOrigin::Imported)
    }

    fn add(&mut self, path: &Path, origin: UnitOrigin) -> Option<UnitId> {
        let shared = self.options.output == OutputMode::Merged && origin == UnitOrigin::CommandLine;
        let toolchain = &mut self.toolchain;
        let admission = self.registry.register(path, origin, |canonical| {
            if shared {
                UnitEmitter::Shared
            } else {
                UnitEmitter::Owned(toolchain.create_emitter(canonical))
            }
        });

        let admission = match admission {
            Ok(admission) => admission,
            Err(err) => {
                warn!("{}", err);
                self.diagnostics.add(Diagnostic::warning(err.to_string()));
                return None;
            }
        };

        let id = admission.id();
        if shared {
            let canonical = self.registry[id].path().to_path_buf();
            if self.main_emitter.is_none() {
                self.main_emitter = Some(self.toolchain.create_emitter(&canonical));
            }
            self.last_main = Some(canonical);
        }
        Some(id)
    }

    /// Install the optimizer used when `optimize` is set.
    pub fn set_optimizer(&mut self, optimizer: impl BytecodeOptimizer + 'static) {
        self.optimizer = Some(Box::new(optimizer));
    }

    /// Install a packager; merged output goes through it instead of `<name>.abc`.
    pub fn set_packager(&mut self, packager: impl Packager + 'static) {
        self.packager = Some(Box::new(packager));
    }

    /// Compile every added unit and whatever the classpath pulls in.
    ///
    /// Only a failure to read a unit's file is returned as an error.
    /// Everything else is reported through diagnostics and the summary.
    pub fn run(&mut self) -> Result<BatchSummary, CompileError> {
        let started = Instant::now();

        let report = Pipeline {
            registry: &mut self.registry,
            toolchain: &mut self.toolchain,
            edges: &mut self.edges,
            classpath: &self.classpath,
            options: &self.options,
            main_emitter: self.main_emitter.as_mut(),
            diagnostics: &mut self.diagnostics,
        }
        .run()?;

        let mut outputs = report.written;
        if self.options.output == OutputMode::Merged {
            outputs.extend(self.write_merged());
        }

        let summary = BatchSummary {
            files: self.registry.len(),
            elapsed: started.elapsed(),
            outputs,
            circular: report.circular,
            unresolved: report.unresolved,
            error_counts: self
                .registry
                .iter()
                .map(|(_, unit)| (unit.path().to_path_buf(), unit.error_count()))
                .collect(),
        };
        info!("Files: {} Time: {}ms", summary.files, summary.elapsed.as_millis());
        Ok(summary)
    }

    fn write_merged(&mut self) -> Vec<PathBuf> {
        if self.registry.iter().any(|(_, unit)| unit.has_errors()) {
            warn!("errors found; merged output not written");
            return Vec::new();
        }
        let (Some(emitter), Some(last_main)) = (self.main_emitter.as_mut(), self.last_main.as_ref())
        else {
            return Vec::new();
        };

        let target = MergedTarget::resolve(&self.options, last_main);
        let optimizer = self
            .optimizer
            .as_mut()
            .map(|optimizer| &mut **optimizer as &mut dyn BytecodeOptimizer);
        let packager = self
            .packager
            .as_mut()
            .map(|packager| &mut **packager as &mut dyn Packager);

        match output::write_merged(emitter, &target, &self.options, optimizer, packager) {
            Ok(written) => written,
            Err(err) => {
                error!("{}", err);
                self.diagnostics.add(Diagnostic::error(err.to_string()));
                Vec::new()
            }
        }
    }

    /// Drop every unit, edge, emitter and diagnostic. Options and toolchain are kept.
    pub fn clear(&mut self) {
        self.registry.clear();
        self.edges.clear();
        self.main_emitter = None;
        self.last_main = None;
        self.diagnostics.clear();
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn registry(&self) -> &UnitRegistry<T::Emitter> {
        &self.registry
    }

    pub fn edges(&self) -> &DependencyEdges {
        &self.edges
    }

    /// Session-level diagnostics: unresolved and circular references, skipped inputs.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn toolchain(&self) -> &T {
        &self.toolchain
    }

    pub fn toolchain_mut(&mut self) -> &mut T {
        &mut self.toolchain
    }

    /// The shared emitter of merged output.
    pub fn main_emitter(&self) -> Option<&T::Emitter> {
        self.main_emitter.as_ref()
    }
}
