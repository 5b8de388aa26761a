//! Symbol lookup across registered units.
//!
//! Both strategies scan units in registration order, so the earliest unit
//! that defines a name wins. Units admitted but not yet parsed define nothing.

use std::path::Path;

use asc_core::{QualifiedName, UnitId};
use asc_registry::{UnitEmitter, UnitRegistry};

use crate::ClasspathResolver;

/// How a reference list is matched against units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupStrategy {
    /// Match a class definition's builder-assigned name.
    Class,
    /// Match any binding kind in a unit's top-level name table.
    Definition,
}

/// First unit declaring a class named `name`.
pub fn find_class<E>(registry: &UnitRegistry<E>, name: &QualifiedName) -> Option<UnitId> {
    registry.iter().find_map(|(id, unit)| {
        unit.program
            .as_ref()
            .filter(|program| program.defines_class(name))
            .map(|_| id)
    })
}

/// First unit whose top-level frame binds `name` under any kind.
pub fn find_definition<E>(registry: &UnitRegistry<E>, name: &QualifiedName) -> Option<UnitId> {
    registry.iter().find_map(|(id, unit)| {
        unit.program
            .as_ref()
            .filter(|program| {
                program
                    .frame
                    .builder
                    .names()
                    .contains_any_kind(&name.name, &name.namespace)
            })
            .map(|_| id)
    })
}

/// Look `name` up in registered units, then fall back to the classpath.
pub fn locate<E>(
    registry: &mut UnitRegistry<E>,
    classpath: &ClasspathResolver,
    strategy: LookupStrategy,
    name: &QualifiedName,
    make_emitter: impl FnOnce(&Path) -> UnitEmitter<E>,
) -> Option<UnitId> {
    let found = match strategy {
        LookupStrategy::Class => find_class(registry, name),
        LookupStrategy::Definition => find_definition(registry, name),
    };
    found.or_else(|| classpath.search(registry, name, make_emitter))
}
