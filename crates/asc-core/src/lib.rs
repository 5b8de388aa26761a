//! Core model types for the asc batch compiler.
//!
//! ## Modules
//!
//! - [`ids`]: Unit identifiers
//! - [`namespace`] / [`qualified_name`]: Resolution keys
//! - [`unresolved`]: Unresolved references produced by parsing and analysis
//! - [`frame`]: Frames, builders, name tables and slots
//! - [`program`]: The parsed program tree as seen by the driver
//! - [`context`]: Per-unit compilation context
//! - [`diagnostics`]: Diagnostic collection
//! - [`analyzer`] / [`emitter`]: Collaborator seams
//! - [`error`]: Error types

pub mod analyzer;
pub mod config_var;
pub mod context;
pub mod diagnostics;
pub mod emitter;
pub mod error;
pub mod frame;
pub mod ids;
pub mod namespace;
pub mod program;
pub mod qualified_name;
mod span;
pub mod unresolved;

pub use analyzer::{ConstantEvaluator, FlowAnalyzer};
pub use config_var::ConfigVar;
pub use context::{ScopeKind, UnitContext};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use emitter::Emitter;
pub use error::{CompileError, ConfigVarError, RegistryError};
pub use frame::{BindingKind, Builder, Frame, NameKey, Names, Slot};
pub use ids::UnitId;
pub use namespace::{Namespace, NamespaceKind};
pub use program::{AnalysisState, ClassDefinition, ProgramNode, ReferenceList};
pub use qualified_name::QualifiedName;
pub use span::Span;
pub use unresolved::UnresolvedReference;
