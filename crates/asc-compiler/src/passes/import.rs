//! Import pass: link slots along type (or expression) edges.

use tracing::debug;

use asc_registry::{EdgeSet, UnitRegistry};

use super::link_pending;

/// Output of an import pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutput {
    pub linked: usize,
    /// Edges already linked through inheritance.
    pub skipped: usize,
}

/// Links every unprocessed edge not already covered by inheritance.
pub struct ImportPass<'a, E> {
    registry: &'a mut UnitRegistry<E>,
    edges: &'a mut EdgeSet,
    inheritance: &'a EdgeSet,
}

impl<'a, E> ImportPass<'a, E> {
    pub fn new(
        registry: &'a mut UnitRegistry<E>,
        edges: &'a mut EdgeSet,
        inheritance: &'a EdgeSet,
    ) -> Self {
        Self {
            registry,
            edges,
            inheritance,
        }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(self) -> ImportOutput {
        let (linked, skipped) = link_pending(self.registry, self.edges, Some(self.inheritance));
        debug!(linked, skipped, "imported bindings");
        ImportOutput { linked, skipped }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asc_core::{BindingKind, Namespace, ProgramNode, Slot, UnitId};
    use asc_registry::{UnitEmitter, UnitOrigin};

    #[test]
    fn links_type_edges_once() {
        let mut registry: UnitRegistry<()> = UnitRegistry::new();
        for name in ["a.as", "b.as", "c.as"] {
            let id = registry
                .admit(name.into(), UnitOrigin::CommandLine, |_| UnitEmitter::Owned(()))
                .id();
            let mut program = ProgramNode::new();
            program
                .frame
                .builder
                .define(name, Namespace::public(""), BindingKind::Get, Slot::default());
            registry[id].program = Some(program);
        }
        let mut inheritance = EdgeSet::new();
        inheritance.insert(UnitId::new(0), UnitId::new(1));
        let mut types = EdgeSet::new();
        types.insert(UnitId::new(0), UnitId::new(1));
        types.insert(UnitId::new(0), UnitId::new(2));

        let output = ImportPass::new(&mut registry, &mut types, &inheritance).run();
        assert_eq!(output, ImportOutput { linked: 1, skipped: 1 });

        let frame = &registry[UnitId::new(0)].program.as_ref().unwrap().frame;
        assert!(frame.builder.names().contains("c.as", &Namespace::public(""), BindingKind::Get));
        assert!(!frame.builder.names().contains("b.as", &Namespace::public(""), BindingKind::Get));

        let again = ImportPass::new(&mut registry, &mut types, &inheritance).run();
        assert_eq!(again, ImportOutput::default());
    }
}
