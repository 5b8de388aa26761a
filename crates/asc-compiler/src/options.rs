//! Compiler options.
//!
//! [`CompilerOptions`] follows a builder pattern: start from
//! [`CompilerOptions::default`] (batch driver, one output file per unit,
//! classpath rooted at the current directory) and refine with `with_*`.
//!
//! ```
//! use asc_compiler::{CompilerOptions, DriverMode, OutputMode};
//!
//! let options = CompilerOptions::default()
//!     .with_mode(DriverMode::Script)
//!     .with_output(OutputMode::Merged)
//!     .with_builtin(true)
//!     .with_config_var("CONFIG::debug=false")
//!     .unwrap();
//! assert!(options.validate().is_ok());
//! assert!(options.policy().skip_attribute_references);
//! ```

use std::path::PathBuf;

use asc_core::{CompileError, ConfigVar, ConfigVarError};

/// Which driver variant runs the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DriverMode {
    /// Compile every unit to its own output; report every unresolved reference.
    #[default]
    Batch,
    /// Library build: expression references bind across units, runtime misses are silent.
    Script,
}

impl DriverMode {
    /// The reference policy this mode implies.
    pub const fn policy(self) -> ReferencePolicy {
        match self {
            DriverMode::Batch => ReferencePolicy::BATCH,
            DriverMode::Script => ReferencePolicy::SCRIPT,
        }
    }
}

/// How unresolved and cross-unit references are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReferencePolicy {
    /// Ignore attribute identifier references (`@name`) when resolving expressions.
    pub skip_attribute_references: bool,
    /// Emit a diagnostic for expression references that stay unresolved.
    pub report_unresolved_expressions: bool,
    /// Record expression edges for resolved expression references.
    pub record_expression_edges: bool,
    /// Link slots along expression edges.
    pub import_expression_bindings: bool,
    /// Give each bytecode input inheritance edges to the bytecode inputs parsed before it.
    pub link_binary_imports: bool,
    /// Name the line and file in unresolved-reference diagnostics.
    pub annotate_lines: bool,
}

impl ReferencePolicy {
    pub const BATCH: ReferencePolicy = ReferencePolicy {
        skip_attribute_references: false,
        report_unresolved_expressions: true,
        record_expression_edges: false,
        import_expression_bindings: false,
        link_binary_imports: false,
        annotate_lines: false,
    };

    pub const SCRIPT: ReferencePolicy = ReferencePolicy {
        skip_attribute_references: true,
        report_unresolved_expressions: false,
        record_expression_edges: true,
        import_expression_bindings: true,
        link_binary_imports: true,
        annotate_lines: true,
    };
}

impl Default for ReferencePolicy {
    fn default() -> Self {
        Self::BATCH
    }
}

/// Where generated code goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputMode {
    /// One `.abc` per compiled unit.
    #[default]
    PerUnit,
    /// One `.abc` shared by every main unit.
    Merged,
}

/// Options for one compilation session.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    pub mode: DriverMode,
    /// Overrides the mode's default policy.
    pub policy_override: Option<ReferencePolicy>,
    pub output: OutputMode,
    /// Roots searched, in order, for `<package path>/<Name>.as`.
    pub classpath: Vec<PathBuf>,
    pub use_namespaces: Vec<String>,
    pub config_vars: Vec<ConfigVar>,
    /// Merged output name, without suffix. Defaults to the last main file's stem.
    pub output_file: Option<String>,
    /// Output directory. Defaults to the directory of each source (per unit)
    /// or of the last main file (merged).
    pub output_dir: Option<PathBuf>,
    /// Building the VM's builtin library: the first script is moved last.
    pub builtin: bool,
    pub optimize: bool,
    pub api_versioning: bool,
    /// Check API versions during metadata and constant evaluation.
    pub check_version: bool,
    pub debug: bool,
    pub strict: bool,
    /// Write `.h`/`.cpp` native stubs beside merged output.
    pub native_stubs: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            mode: DriverMode::default(),
            policy_override: None,
            output: OutputMode::default(),
            classpath: vec![PathBuf::from(".")],
            use_namespaces: Vec::new(),
            config_vars: Vec::new(),
            output_file: None,
            output_dir: None,
            builtin: false,
            optimize: false,
            api_versioning: false,
            check_version: false,
            debug: false,
            strict: false,
            native_stubs: false,
        }
    }
}

impl CompilerOptions {
    /// The policy in effect.
    pub fn policy(&self) -> ReferencePolicy {
        self.policy_override.unwrap_or(self.mode.policy())
    }

    pub fn with_mode(mut self, mode: DriverMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_policy(mut self, policy: ReferencePolicy) -> Self {
        self.policy_override = Some(policy);
        self
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    /// Replace the classpath roots.
    pub fn with_classpath<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.classpath = roots.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_use_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.use_namespaces.push(namespace.into());
        self
    }

    /// Add a `NS::name=value` configuration variable.
    pub fn with_config_var(mut self, text: &str) -> Result<Self, ConfigVarError> {
        self.config_vars.push(ConfigVar::parse(text)?);
        Ok(self)
    }

    pub fn with_output_file(mut self, name: impl Into<String>) -> Self {
        self.output_file = Some(name.into());
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_builtin(mut self, builtin: bool) -> Self {
        self.builtin = builtin;
        self
    }

    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    pub fn with_api_versioning(mut self, enabled: bool) -> Self {
        self.api_versioning = enabled;
        self
    }

    pub fn with_check_version(mut self, enabled: bool) -> Self {
        self.check_version = enabled;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_native_stubs(mut self, enabled: bool) -> Self {
        self.native_stubs = enabled;
        self
    }

    /// Reject combinations that cannot be honoured.
    pub fn validate(&self) -> Result<(), CompileError> {
        if self.api_versioning && !self.builtin {
            return Err(CompileError::InvalidOptions(
                "API versioning is only supported when building the builtin library".into(),
            ));
        }
        if self.output == OutputMode::PerUnit {
            let merged_only = [
                (self.builtin, "builtin"),
                (self.optimize, "optimize"),
                (self.native_stubs, "native stubs"),
                (self.output_file.is_some(), "an output file name"),
            ];
            if let Some((_, what)) = merged_only.iter().find(|(set, _)| *set) {
                return Err(CompileError::InvalidOptions(format!(
                    "{} requires merged output",
                    what
                )));
            }
        }
        Ok(())
    }
}
