//! Per-unit state held by the registry.

use std::fmt;
use std::path::{Path, PathBuf};

use bitflags::bitflags;

use asc_core::{FlowAnalyzer, ProgramNode, UnitContext};

/// Source suffix; every other suffix is treated as precompiled bytecode.
pub const SOURCE_EXTENSION: &str = "as";

/// Suffix of emitted bytecode files.
pub const BYTECODE_EXTENSION: &str = "abc";

/// How a unit entered the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitOrigin {
    /// Named by the caller as a file to compile.
    CommandLine,
    /// Named by the caller as an import (definitions only, never written).
    Imported,
    /// Admitted by classpath fallback while resolving a reference.
    Classpath,
}

/// The emitter slot of a unit.
#[derive(Debug)]
pub enum UnitEmitter<E> {
    /// The unit owns its emitter.
    Owned(E),
    /// The unit generates into the session's shared main emitter.
    Shared,
    /// Output was written; nothing further may be generated.
    Flushed,
}

impl<E> UnitEmitter<E> {
    /// Whether the unit can still generate code.
    pub fn is_available(&self) -> bool {
        !matches!(self, UnitEmitter::Flushed)
    }

    pub fn as_owned_mut(&mut self) -> Option<&mut E> {
        match self {
            UnitEmitter::Owned(emitter) => Some(emitter),
            _ => None,
        }
    }

    /// Take the owned emitter, leaving the slot flushed.
    pub fn flush(&mut self) -> Option<E> {
        match std::mem::replace(self, UnitEmitter::Flushed) {
            UnitEmitter::Owned(emitter) => Some(emitter),
            UnitEmitter::Shared => None,
            UnitEmitter::Flushed => None,
        }
    }
}

bitflags! {
    /// Pipeline phases a unit has completed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct UnitPhases: u8 {
        const PARSED = 1 << 0;
        const FIRST_PASS = 1 << 1;
        const SECOND_PASS = 1 << 2;
        const METADATA = 1 << 3;
        const CONSTANTS = 1 << 4;
        const GENERATED = 1 << 5;
        const EMITTED = 1 << 6;
    }
}

/// One source or bytecode input and everything the pipeline knows about it.
pub struct CompilationUnit<E> {
    path: PathBuf,
    pub origin: UnitOrigin,
    pub context: UnitContext,
    pub emitter: UnitEmitter<E>,
    /// `None` until parsed.
    pub program: Option<ProgramNode>,
    /// Created by the first flow-analysis pass.
    pub analyzer: Option<Box<dyn FlowAnalyzer>>,
    pub phases: UnitPhases,
}

impl<E> CompilationUnit<E> {
    /// An empty, unparsed unit for a canonical path.
    pub fn new(path: PathBuf, origin: UnitOrigin, emitter: UnitEmitter<E>) -> Self {
        let context = UnitContext::for_file(&path);
        Self {
            path,
            origin,
            context,
            emitter,
            program: None,
            analyzer: None,
            phases: UnitPhases::empty(),
        }
    }

    /// Canonical path; the unit's identity.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.context.script_name
    }

    /// `.as` source rather than precompiled bytecode.
    pub fn is_source(&self) -> bool {
        is_source_path(&self.path)
    }

    pub fn error_count(&self) -> usize {
        self.context.error_count()
    }

    pub fn has_errors(&self) -> bool {
        self.context.has_errors()
    }

    pub fn is_parsed(&self) -> bool {
        self.program.is_some()
    }

    /// Bytecode path: the source path with its suffix swapped.
    pub fn bytecode_path(&self) -> PathBuf {
        self.path.with_extension(BYTECODE_EXTENSION)
    }
}

impl<E> fmt::Debug for CompilationUnit<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilationUnit")
            .field("path", &self.path)
            .field("origin", &self.origin)
            .field("phases", &self.phases)
            .field("parsed", &self.program.is_some())
            .field("analyzer", &self.analyzer.is_some())
            .field("errors", &self.error_count())
            .finish()
    }
}

/// Whether `path` names source (`.as`) rather than bytecode.
pub fn is_source_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_unit_is_unparsed() {
        let unit: CompilationUnit<()> = CompilationUnit::new(
            PathBuf::from("/src/A.as"),
            UnitOrigin::CommandLine,
            UnitEmitter::Owned(()),
        );
        assert!(!unit.is_parsed());
        assert!(unit.is_source());
        assert_eq!(unit.file_name(), "A.as");
        assert_eq!(unit.phases, UnitPhases::empty());
        assert_eq!(unit.bytecode_path(), PathBuf::from("/src/A.abc"));
    }

    #[test]
    fn bytecode_input_is_not_source() {
        assert!(!is_source_path(Path::new("lib/playerglobal.abc")));
        assert!(!is_source_path(Path::new("Makefile")));
        assert!(is_source_path(Path::new("B.as")));
    }

    #[test]
    fn flush_takes_owned_emitter() {
        let mut slot = UnitEmitter::Owned(7u8);
        assert!(slot.is_available());
        assert_eq!(slot.flush(), Some(7));
        assert!(!slot.is_available());
        assert_eq!(slot.flush(), None);

        let mut shared: UnitEmitter<u8> = UnitEmitter::Shared;
        assert!(shared.as_owned_mut().is_none());
        assert!(shared.is_available());
    }
}
