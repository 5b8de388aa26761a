//! Error types for the batch compiler.
//!
//! Only unexpected failures are errors. Unresolved references, circular
//! inheritance and per-unit parse failures are reported as diagnostics and
//! never cross a phase boundary.
//!
//! ## Error Hierarchy
//!
//! ```text
//! CompileError (aborts a batch)
//! ├── Io             - reading a unit's source failed
//! ├── InvalidOptions - inconsistent compiler options
//! ├── ConfigVar      - malformed configuration variable
//! └── Registry       - unit registration failures
//! ```

use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// Registry Errors
// ============================================================================

/// Errors raised while registering a compilation unit.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The path exists but is not a regular file.
    #[error("'{}' is not a regular file", path.display())]
    NotAFile { path: PathBuf },

    /// The path could not be canonicalized.
    #[error("cannot canonicalize '{}': {source}", path.display())]
    Canonicalize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A reordering does not cover every registered unit.
    #[error("permutation of {actual} units applied to a registry of {expected}")]
    PermutationLength { expected: usize, actual: usize },
}

// ============================================================================
// Configuration Variable Errors
// ============================================================================

/// Errors parsing a `NS::name=value` configuration variable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigVarError {
    /// No `::` separator between namespace and name.
    #[error("configuration variable '{0}' is missing the '::' namespace separator")]
    MissingNamespace(String),

    /// No `=` separator before the value.
    #[error("configuration variable '{0}' is missing '=value'")]
    MissingValue(String),

    /// Namespace or name is empty.
    #[error("configuration variable '{0}' has an empty namespace or name")]
    EmptyName(String),
}

// ============================================================================
// Compile Errors
// ============================================================================

/// Failures that abort a compilation batch.
#[derive(Debug, Error)]
pub enum CompileError {
    /// An I/O operation on a unit failed.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The compiler options are inconsistent.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// A configuration variable could not be parsed.
    #[error(transparent)]
    ConfigVar(#[from] ConfigVarError),

    /// A unit could not be registered.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl CompileError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CompileError::Io {
            path: path.into(),
            source,
        }
    }
}
