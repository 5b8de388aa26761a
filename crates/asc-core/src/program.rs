//! The parsed program tree as seen by the driver.
//!
//! The driver never looks inside statements. It only needs the analysis
//! state, the five unresolved-reference lists, the top-level frame, and the
//! class definitions. Anything else a toolchain needs travels in
//! [`ProgramNode::body`].

use std::any::Any;
use std::fmt;
use std::mem;

use crate::{Builder, Frame, QualifiedName, UnresolvedReference};

/// Where a program is in flow analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnalysisState {
    /// Parsed; the first (inheritance discovery) pass has not run.
    #[default]
    Inheritance,
    /// The first pass completed; ready for the second pass.
    Else,
}

/// A class (or interface) declared by a unit.
#[derive(Debug, Clone, Default)]
pub struct ClassDefinition {
    /// Class frame; its builder carries the assigned class name.
    pub frame: Frame,
    /// Declared as an interface.
    pub is_interface: bool,
}

impl ClassDefinition {
    /// A class definition whose builder is named `name`.
    pub fn new(name: QualifiedName) -> Self {
        Self {
            frame: Frame::with_builder(Builder::for_class(name)),
            is_interface: false,
        }
    }

    pub fn interface(name: QualifiedName) -> Self {
        Self {
            is_interface: true,
            ..Self::new(name)
        }
    }

    /// The builder-assigned class name, if the builder has been named.
    pub fn name(&self) -> Option<&QualifiedName> {
        self.frame.builder.classname.as_ref()
    }
}

/// The five unresolved-reference lists a program carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceList {
    /// Found by the first flow-analysis pass: base classes and interfaces.
    Inheritance,
    /// Type annotations needed by constant evaluation.
    ConstantEvaluation,
    /// Types referenced from function bodies.
    Body,
    /// Namespace references.
    Namespace,
    /// Runtime expression references.
    Runtime,
}

impl ReferenceList {
    pub const ALL: [ReferenceList; 5] = [
        ReferenceList::Inheritance,
        ReferenceList::ConstantEvaluation,
        ReferenceList::Body,
        ReferenceList::Namespace,
        ReferenceList::Runtime,
    ];
}

impl fmt::Display for ReferenceList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReferenceList::Inheritance => "fa_unresolved",
            ReferenceList::ConstantEvaluation => "ce_unresolved",
            ReferenceList::Body => "body_unresolved",
            ReferenceList::Namespace => "ns_unresolved",
            ReferenceList::Runtime => "rt_unresolved",
        };
        f.write_str(name)
    }
}

/// A parsed compilation unit.
#[derive(Default)]
pub struct ProgramNode {
    pub state: AnalysisState,
    pub fa_unresolved: Vec<UnresolvedReference>,
    pub ce_unresolved: Vec<UnresolvedReference>,
    pub body_unresolved: Vec<UnresolvedReference>,
    pub ns_unresolved: Vec<UnresolvedReference>,
    pub rt_unresolved: Vec<UnresolvedReference>,
    /// Top-level lexical scope.
    pub frame: Frame,
    /// Class definitions, in declaration order.
    pub class_defs: Vec<ClassDefinition>,
    /// Toolchain-specific payload (statements, bytecode blocks).
    pub body: Option<Box<dyn Any>>,
}

impl ProgramNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable access to one of the reference lists.
    pub fn unresolved_mut(&mut self, list: ReferenceList) -> &mut Vec<UnresolvedReference> {
        match list {
            ReferenceList::Inheritance => &mut self.fa_unresolved,
            ReferenceList::ConstantEvaluation => &mut self.ce_unresolved,
            ReferenceList::Body => &mut self.body_unresolved,
            ReferenceList::Namespace => &mut self.ns_unresolved,
            ReferenceList::Runtime => &mut self.rt_unresolved,
        }
    }

    pub fn unresolved(&self, list: ReferenceList) -> &[UnresolvedReference] {
        match list {
            ReferenceList::Inheritance => &self.fa_unresolved,
            ReferenceList::ConstantEvaluation => &self.ce_unresolved,
            ReferenceList::Body => &self.body_unresolved,
            ReferenceList::Namespace => &self.ns_unresolved,
            ReferenceList::Runtime => &self.rt_unresolved,
        }
    }

    /// Drain a reference list, leaving it empty.
    pub fn take_unresolved(&mut self, list: ReferenceList) -> Vec<UnresolvedReference> {
        mem::take(self.unresolved_mut(list))
    }

    /// Find a class whose builder-assigned name equals `name`.
    pub fn defines_class(&self, name: &QualifiedName) -> bool {
        self.class_defs.iter().any(|def| def.name() == Some(name))
    }

    /// Downcast the toolchain payload.
    pub fn body_as<T: 'static>(&self) -> Option<&T> {
        self.body.as_ref().and_then(|b| b.downcast_ref::<T>())
    }
}

impl fmt::Debug for ProgramNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgramNode")
            .field("state", &self.state)
            .field("fa_unresolved", &self.fa_unresolved)
            .field("ce_unresolved", &self.ce_unresolved)
            .field("body_unresolved", &self.body_unresolved)
            .field("ns_unresolved", &self.ns_unresolved)
            .field("rt_unresolved", &self.rt_unresolved)
            .field("frame", &self.frame)
            .field("class_defs", &self.class_defs)
            .field("body", &self.body.as_ref().map(|_| ".."))
            .finish()
    }
}
