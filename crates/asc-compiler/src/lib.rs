//! Multi-pass resolution pipeline for the asc batch compiler.
//!
//! ## Architecture
//!
//! ```text
//! CompilationSession
//!   ├── UnitRegistry        units, deduplicated by canonical path
//!   ├── DependencyEdges     inheritance / type / expression edges
//!   ├── ClasspathResolver   admits units for names nothing defines yet
//!   ├── Toolchain           parser, analyzers, code generator
//!   └── main emitter        merged output
//!
//! Pipeline::run
//!   parse → first pass → resolve inheritance → sort → second pass
//!   → resolve types → import → evaluate → codegen → resolve expressions
//!   (repeated until no unit is admitted)
//! ```
//!
//! ## Modules
//!
//! - [`options`]: Driver mode, reference policy and output configuration
//! - [`toolchain`]: The collaborator seam
//! - [`classpath`]: Classpath fallback
//! - [`lookup`]: Symbol lookup across units
//! - [`passes`]: The pipeline passes
//! - [`pipeline`]: The fixed-point driver
//! - [`session`]: Session lifecycle and batch summary
//! - [`bytecode`] / [`emit`]: Default bytecode container
//! - [`output`]: Per-unit, merged and native-stub output

pub mod bytecode;
pub mod classpath;
pub mod emit;
pub mod lookup;
pub mod options;
pub mod output;
pub mod passes;
pub mod pipeline;
pub mod session;
pub mod toolchain;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use classpath::ClasspathResolver;
pub use emit::BlockEmitter;
pub use lookup::{LookupStrategy, find_class, find_definition, locate};
pub use options::{CompilerOptions, DriverMode, OutputMode, ReferencePolicy};
pub use output::{BytecodeOptimizer, MergedTarget, OutputError, Packager};
pub use passes::UnresolvedReport;
pub use pipeline::{DependencyEdges, Pipeline, PipelineReport, link_binary_imports};
pub use session::{BatchSummary, CompilationSession};
pub use toolchain::Toolchain;
