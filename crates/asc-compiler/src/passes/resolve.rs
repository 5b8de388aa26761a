//! Reference resolution: drain a unit's unresolved-reference lists into
//! dependency edges.
//!
//! ## Algorithm
//!
//! For each reference, try each candidate namespace in order:
//!
//! 1. Build `namespace:name`
//! 2. Look it up in registered units (registration order), then on the classpath
//! 3. First match wins; record `(unit, defining unit)` unless they are the same
//!
//! A reference no candidate matches is reported and otherwise ignored. The
//! list is left empty either way, so no reference is resolved twice.

use std::ops::Range;
use std::path::PathBuf;

use tracing::warn;

use asc_core::{Diagnostic, Diagnostics, ReferenceList, UnitId, UnresolvedReference};
use asc_registry::{EdgeSet, UnitEmitter, UnitRegistry};

use crate::lookup::{LookupStrategy, locate};
use crate::{ClasspathResolver, ReferencePolicy, Toolchain};

/// An unresolved reference as reported to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReport {
    pub unit: PathBuf,
    pub reference: UnresolvedReference,
    pub message: String,
}

/// Output of one drain.
#[derive(Debug, Default)]
pub struct ResolveOutput {
    pub resolved: usize,
    /// New edges recorded.
    pub edges_added: usize,
    /// References skipped by policy (attribute identifiers).
    pub skipped: usize,
    pub unresolved: Vec<UnresolvedReport>,
}

impl ResolveOutput {
    fn absorb(&mut self, other: ResolveOutput) {
        self.resolved += other.resolved;
        self.edges_added += other.edges_added;
        self.skipped += other.skipped;
        self.unresolved.extend(other.unresolved);
    }
}

/// Drains reference lists, growing the registry through the classpath.
pub struct ResolvePass<'a, T: Toolchain> {
    registry: &'a mut UnitRegistry<T::Emitter>,
    toolchain: &'a mut T,
    classpath: &'a ClasspathResolver,
    policy: ReferencePolicy,
    diagnostics: &'a mut Diagnostics,
}

impl<'a, T: Toolchain> ResolvePass<'a, T> {
    pub fn new(
        registry: &'a mut UnitRegistry<T::Emitter>,
        toolchain: &'a mut T,
        classpath: &'a ClasspathResolver,
        policy: ReferencePolicy,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            registry,
            toolchain,
            classpath,
            policy,
            diagnostics,
        }
    }

    /// Inheritance references of units in `range` into `inheritance` edges.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn inheritance(&mut self, range: Range<usize>, inheritance: &mut EdgeSet) -> ResolveOutput {
        self.drain(range, ReferenceList::Inheritance, LookupStrategy::Class, Some(inheritance))
    }

    /// Type, body and namespace references of every unit into `types` edges.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn types(&mut self, types: &mut EdgeSet) -> ResolveOutput {
        let range = 0..self.registry.len();
        let mut output = self.drain(
            range.clone(),
            ReferenceList::ConstantEvaluation,
            LookupStrategy::Class,
            Some(types),
        );
        output.absorb(self.drain(range.clone(), ReferenceList::Body, LookupStrategy::Class, Some(types)));
        output.absorb(self.drain(range, ReferenceList::Namespace, LookupStrategy::Definition, Some(types)));
        output
    }

    /// Runtime expression references of every unit.
    ///
    /// Edges are recorded only when the policy asks for them; misses are
    /// reported only when the policy asks for it.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn expressions(&mut self, expressions: &mut EdgeSet) -> ResolveOutput {
        let edges = self.policy.record_expression_edges.then_some(expressions);
        self.drain(
            0..self.registry.len(),
            ReferenceList::Runtime,
            LookupStrategy::Definition,
            edges,
        )
    }

    fn drain(
        &mut self,
        range: Range<usize>,
        list: ReferenceList,
        strategy: LookupStrategy,
        mut edges: Option<&mut EdgeSet>,
    ) -> ResolveOutput {
        let mut output = ResolveOutput::default();
        let runtime = list == ReferenceList::Runtime;

        for index in range {
            let id = UnitId::from(index);
            let references = match self.registry[id].program.as_mut() {
                Some(program) => program.take_unresolved(list),
                None => continue,
            };

            for reference in references {
                if runtime && reference.is_attribute && self.policy.skip_attribute_references {
                    output.skipped += 1;
                    continue;
                }

                match self.resolve(&reference, strategy, runtime) {
                    Some(found) => {
                        output.resolved += 1;
                        if let (Some(where_), Some(edges)) = (found, edges.as_deref_mut()) {
                            if where_ != id && edges.insert(id, where_) {
                                output.edges_added += 1;
                            }
                        }
                    }
                    None if runtime && !self.policy.report_unresolved_expressions => {}
                    None => output.unresolved.push(self.report(id, reference)),
                }
            }
        }

        output
    }

    /// `Some(Some(unit))` for a defining unit, `Some(None)` for a reference
    /// satisfied without one, `None` when nothing matches.
    fn resolve(
        &mut self,
        reference: &UnresolvedReference,
        strategy: LookupStrategy,
        runtime: bool,
    ) -> Option<Option<UnitId>> {
        for candidate in reference.candidates() {
            if runtime && candidate.namespace.is_resolved_placeholder() {
                return Some(None);
            }
            let toolchain = &mut *self.toolchain;
            let found = locate(&mut *self.registry, self.classpath, strategy, &candidate, |path| {
                UnitEmitter::Owned(toolchain.create_emitter(path))
            });
            if let Some(unit) = found {
                return Some(Some(unit));
            }
        }
        None
    }

    fn report(&mut self, id: UnitId, reference: UnresolvedReference) -> UnresolvedReport {
        let unit = &self.registry[id];
        let path = unit.path().to_path_buf();
        let message = if self.policy.annotate_lines {
            format!(
                "{} on line {} of file {} not resolved",
                reference.to_multiname(),
                reference.span.line,
                path.display()
            )
        } else {
            format!("{} in {} not resolved", reference.to_multiname(), path.display())
        };
        warn!("{}", message);
        self.diagnostics.add(
            Diagnostic::warning(message.clone())
                .in_file(unit.file_name())
                .at(reference.span),
        );
        UnresolvedReport {
            unit: path,
            reference,
            message,
        }
    }
}
