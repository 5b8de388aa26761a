//! Unit reordering.
//!
//! A [`Permutation`] lists old unit ids in their new order. [`reindex`]
//! applies one atomically to the registry and to every edge set, so an edge
//! keeps naming the same pair of units after renumbering.

use asc_core::{RegistryError, UnitId};

use crate::{EdgeSet, UnitRegistry};

/// A bijection over `[0, len)`: position `new` holds the old id placed there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    order: Vec<UnitId>,
    new_of_old: Vec<UnitId>,
}

impl Permutation {
    /// Build from the new order. Returns `None` unless `order` contains every
    /// id in `[0, order.len())` exactly once.
    pub fn new(order: Vec<UnitId>) -> Option<Self> {
        let len = order.len();
        let mut new_of_old: Vec<Option<UnitId>> = vec![None; len];
        for (new, &old) in order.iter().enumerate() {
            let slot = new_of_old.get_mut(old.as_usize())?;
            if slot.is_some() {
                return None;
            }
            *slot = Some(UnitId::from(new));
        }
        let new_of_old = new_of_old.into_iter().collect::<Option<Vec<_>>>()?;
        Some(Self { order, new_of_old })
    }

    pub fn identity(len: usize) -> Self {
        let order: Vec<UnitId> = (0..len).map(UnitId::from).collect();
        Self {
            new_of_old: order.clone(),
            order,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn is_identity(&self) -> bool {
        self.order.iter().enumerate().all(|(new, old)| old.as_usize() == new)
    }

    /// Old ids, in new order.
    pub fn order(&self) -> &[UnitId] {
        &self.order
    }

    /// Where `old` lands.
    pub fn new_index(&self, old: UnitId) -> UnitId {
        self.new_of_old[old.as_usize()]
    }

    /// Which old id now sits at `new`.
    pub fn old_index(&self, new: UnitId) -> UnitId {
        self.order[new.as_usize()]
    }
}

/// Apply `permutation` to the registry and every edge set together.
pub fn reindex<E>(
    registry: &mut UnitRegistry<E>,
    edge_sets: &mut [&mut EdgeSet],
    permutation: &Permutation,
) -> Result<(), RegistryError> {
    if permutation.len() != registry.len() {
        return Err(RegistryError::PermutationLength {
            expected: registry.len(),
            actual: permutation.len(),
        });
    }
    if permutation.is_identity() {
        return Ok(());
    }
    registry.permute(permutation);
    for edges in edge_sets.iter_mut() {
        edges.reindex(permutation);
    }
    Ok(())
}
