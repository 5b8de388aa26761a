//! Per-unit compilation context.

use std::path::{Path, PathBuf};

use crate::{ConfigVar, Diagnostic, Diagnostics, QualifiedName, Span};

/// The scope a visitor runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// A fresh global scope (first flow-analysis pass).
    Global,
    /// The unit's own top-level frame (every later pass).
    UnitFrame,
}

/// Diagnostics and transient state for a single compilation unit.
///
/// One context exists per unit and follows the unit through reordering.
#[derive(Debug, Clone, Default)]
pub struct UnitContext {
    /// File name of the unit (`A.as`).
    pub script_name: String,
    /// Directory containing the unit.
    pub path: PathBuf,
    pub diagnostics: Diagnostics,
    scopes: Vec<ScopeKind>,
    /// Package definitions staged by the parser.
    pub package_definitions: Vec<QualifiedName>,
    /// Dotted compound names staged by the parser.
    pub compound_names: Vec<String>,
    /// Conditional-compilation constants visible to the unit.
    pub config_vars: Vec<ConfigVar>,
    /// Namespaces opened for every unit (`use namespace`).
    pub use_namespaces: Vec<String>,
    /// Raised while metadata and constant evaluation check API versions.
    pub check_version: bool,
    /// Emit debug line information.
    pub debug: bool,
    /// Strict-mode type checking.
    pub strict: bool,
}

impl UnitContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for the unit at `file`.
    pub fn for_file(file: &Path) -> Self {
        let mut cx = Self::new();
        cx.bind_file(file);
        cx
    }

    /// Set the script name and directory from a file path.
    pub fn bind_file(&mut self, file: &Path) {
        self.script_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.path = file.parent().map(Path::to_path_buf).unwrap_or_default();
    }

    /// Errors reported against this unit so far.
    pub fn error_count(&self) -> usize {
        self.diagnostics.error_count()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    /// Report an error; the unit skips every later phase.
    pub fn report_error(&mut self, message: impl Into<String>, span: Span) {
        let diagnostic = Diagnostic::error(message)
            .in_file(self.script_name.clone())
            .at(span);
        self.diagnostics.add(diagnostic);
    }

    pub fn report_warning(&mut self, message: impl Into<String>, span: Span) {
        let diagnostic = Diagnostic::warning(message)
            .in_file(self.script_name.clone())
            .at(span);
        self.diagnostics.add(diagnostic);
    }

    pub fn enter_scope(&mut self, scope: ScopeKind) {
        self.scopes.push(scope);
    }

    pub fn exit_scope(&mut self) -> Option<ScopeKind> {
        self.scopes.pop()
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn current_scope(&self) -> Option<ScopeKind> {
        self.scopes.last().copied()
    }

    /// Drop parser staging state so it cannot leak into the next parse.
    pub fn clear_parse_scratch(&mut self) {
        self.package_definitions.clear();
        self.compound_names.clear();
    }
}
