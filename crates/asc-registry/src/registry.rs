//! The compilation unit arena.
//!
//! Units are addressed by [`UnitId`], their position in the arena. The arena
//! only grows (registration) or is reordered as a whole ([`crate::reindex`]);
//! it is never shrunk except by [`UnitRegistry::clear`].

use std::fs;
use std::ops::{Index, IndexMut};
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use tracing::debug;

use asc_core::{RegistryError, UnitId};

use crate::{CompilationUnit, Permutation, UnitEmitter, UnitOrigin};

/// Outcome of registering a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// A new unit was appended.
    New(UnitId),
    /// The canonical path was already registered.
    Existing(UnitId),
}

impl Admission {
    pub fn id(self) -> UnitId {
        match self {
            Admission::New(id) | Admission::Existing(id) => id,
        }
    }

    pub fn is_new(self) -> bool {
        matches!(self, Admission::New(_))
    }
}

/// All compilation units of a session, deduplicated by canonical path.
pub struct UnitRegistry<E> {
    units: Vec<CompilationUnit<E>>,
    by_path: FxHashMap<PathBuf, UnitId>,
}

impl<E> Default for UnitRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> UnitRegistry<E> {
    pub fn new() -> Self {
        Self {
            units: Vec::new(),
            by_path: FxHashMap::default(),
        }
    }

    /// Canonicalize `path`, requiring a regular file.
    pub fn canonicalize(path: &Path) -> Result<PathBuf, RegistryError> {
        let canonical = fs::canonicalize(path).map_err(|source| RegistryError::Canonicalize {
            path: path.to_path_buf(),
            source,
        })?;
        if !canonical.is_file() {
            return Err(RegistryError::NotAFile { path: canonical });
        }
        Ok(canonical)
    }

    /// Register a file, returning the existing id if its canonical path is known.
    ///
    /// `make_emitter` is only called for a new unit.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn register(
        &mut self,
        path: &Path,
        origin: UnitOrigin,
        make_emitter: impl FnOnce(&Path) -> UnitEmitter<E>,
    ) -> Result<Admission, RegistryError> {
        let canonical = Self::canonicalize(path)?;
        Ok(self.admit(canonical, origin, make_emitter))
    }

    /// Register an already-canonical path without touching the filesystem.
    pub fn admit(
        &mut self,
        canonical: PathBuf,
        origin: UnitOrigin,
        make_emitter: impl FnOnce(&Path) -> UnitEmitter<E>,
    ) -> Admission {
        if let Some(&existing) = self.by_path.get(&canonical) {
            return Admission::Existing(existing);
        }
        let id = UnitId::from(self.units.len());
        let emitter = make_emitter(&canonical);
        debug!(unit = %id, path = %canonical.display(), ?origin, "registered unit");
        self.by_path.insert(canonical.clone(), id);
        self.units.push(CompilationUnit::new(canonical, origin, emitter));
        Admission::New(id)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn get(&self, id: UnitId) -> Option<&CompilationUnit<E>> {
        self.units.get(id.as_usize())
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut CompilationUnit<E>> {
        self.units.get_mut(id.as_usize())
    }

    /// Id of the unit with this canonical path.
    pub fn index_of(&self, canonical: &Path) -> Option<UnitId> {
        self.by_path.get(canonical).copied()
    }

    /// Mutable access to `dependent` alongside shared access to `dependency`.
    ///
    /// Returns `None` if the ids are equal or out of range.
    pub fn pair_mut(
        &mut self,
        dependent: UnitId,
        dependency: UnitId,
    ) -> Option<(&mut CompilationUnit<E>, &CompilationUnit<E>)> {
        let (d, s) = (dependent.as_usize(), dependency.as_usize());
        if d == s || d >= self.units.len() || s >= self.units.len() {
            return None;
        }
        if d < s {
            let (low, high) = self.units.split_at_mut(s);
            Some((&mut low[d], &high[0]))
        } else {
            let (low, high) = self.units.split_at_mut(d);
            Some((&mut high[0], &low[s]))
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = UnitId> + use<E> {
        (0..self.units.len()).map(UnitId::from)
    }

    pub fn iter(&self) -> impl Iterator<Item = (UnitId, &CompilationUnit<E>)> {
        self.units
            .iter()
            .enumerate()
            .map(|(i, unit)| (UnitId::from(i), unit))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (UnitId, &mut CompilationUnit<E>)> {
        self.units
            .iter_mut()
            .enumerate()
            .map(|(i, unit)| (UnitId::from(i), unit))
    }

    /// Drop every unit.
    pub fn clear(&mut self) {
        self.units.clear();
        self.by_path.clear();
    }

    /// Move units into `permutation` order. Callers go through [`crate::reindex`]
    /// so edge sets are renumbered in the same step.
    pub(crate) fn permute(&mut self, permutation: &Permutation) {
        let mut slots: Vec<Option<CompilationUnit<E>>> =
            std::mem::take(&mut self.units).into_iter().map(Some).collect();
        self.units = permutation
            .order()
            .iter()
            .filter_map(|old| slots[old.as_usize()].take())
            .collect();
        self.by_path.clear();
        for (i, unit) in self.units.iter().enumerate() {
            self.by_path.insert(unit.path().to_path_buf(), UnitId::from(i));
        }
    }
}

impl<E> Index<UnitId> for UnitRegistry<E> {
    type Output = CompilationUnit<E>;

    fn index(&self, id: UnitId) -> &Self::Output {
        &self.units[id.as_usize()]
    }
}

impl<E> IndexMut<UnitId> for UnitRegistry<E> {
    fn index_mut(&mut self, id: UnitId) -> &mut Self::Output {
        &mut self.units[id.as_usize()]
    }
}
