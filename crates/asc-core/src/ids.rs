//! Identifier types for compilation units.
//!
//! Every parallel table kept by a compilation session is addressed through
//! a dense [`UnitId`] in `[0, unit_count)`.

use std::fmt;

/// Identifies a compilation unit within one session.
///
/// A unit is a single `.as` source file or precompiled bytecode input. The id is
/// the unit's current position in the registry; a topological reordering
/// renumbers every id atomically.
///
/// # Example
///
/// ```
/// use asc_core::UnitId;
///
/// let unit = UnitId::new(3);
/// assert_eq!(unit.index(), 3);
/// assert_eq!(unit.as_usize(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId(u32);

impl UnitId {
    /// Create a new unit ID with the given index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the underlying index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Get the index as a `usize` for slice addressing.
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit_{}", self.0)
    }
}

impl From<u32> for UnitId {
    fn from(index: u32) -> Self {
        Self::new(index)
    }
}

impl From<usize> for UnitId {
    fn from(index: usize) -> Self {
        Self::new(index as u32)
    }
}

impl From<UnitId> for u32 {
    fn from(id: UnitId) -> Self {
        id.0
    }
}
