//! Scope frames, builders, name tables and slots.
//!
//! A unit's top-level [`Frame`] owns a [`Builder`], and the builder owns the
//! [`Names`] table that maps `(name, namespace, kind)` to a [`Slot`]. Cross-unit
//! binding copies entries of one frame's name table into another.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use rustc_hash::FxHashMap;

use crate::{Namespace, QualifiedName};

/// The binding kinds a name table distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum BindingKind {
    /// Getter / plain variable read.
    Get = 0,
    /// Setter / plain variable write.
    Set = 1,
    /// Method call binding.
    Method = 2,
    /// Method local to the declaring scope.
    LocalMethod = 3,
}

impl BindingKind {
    /// Every kind, in table order.
    pub const ALL: [BindingKind; 4] = [
        BindingKind::Get,
        BindingKind::Set,
        BindingKind::Method,
        BindingKind::LocalMethod,
    ];
}

/// A named, typed binding location within a frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Slot {
    /// Declared type, if known.
    pub type_name: Option<QualifiedName>,
    /// Constant binding (`const`, class, function).
    pub is_const: bool,
    /// Linked in from another frame rather than declared here.
    pub inherited: bool,
}

impl Slot {
    /// A slot of the given type.
    pub fn typed(type_name: QualifiedName) -> Self {
        Self {
            type_name: Some(type_name),
            ..Default::default()
        }
    }

    /// Mark as constant.
    pub fn constant(mut self) -> Self {
        self.is_const = true;
        self
    }
}

/// Key of a name table entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameKey {
    pub name: String,
    pub namespace: Namespace,
    pub kind: BindingKind,
}

impl NameKey {
    pub fn new(name: impl Into<String>, namespace: Namespace, kind: BindingKind) -> Self {
        Self {
            name: name.into(),
            namespace,
            kind,
        }
    }
}

/// Insertion-ordered name table.
#[derive(Debug, Clone, Default)]
pub struct Names {
    entries: Vec<(NameKey, usize)>,
    index: FxHashMap<NameKey, usize>,
}

impl Names {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a name to a slot index. Returns `false` if the key was already bound.
    pub fn insert(&mut self, key: NameKey, slot: usize) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, slot));
        true
    }

    /// Slot index bound to the key.
    pub fn get(&self, key: &NameKey) -> Option<usize> {
        self.index.get(key).map(|&at| self.entries[at].1)
    }

    /// Whether `(name, namespace, kind)` is bound.
    pub fn contains(&self, name: &str, namespace: &Namespace, kind: BindingKind) -> bool {
        self.index
            .contains_key(&NameKey::new(name, namespace.clone(), kind))
    }

    /// Whether the name is bound under any kind.
    pub fn contains_any_kind(&self, name: &str, namespace: &Namespace) -> bool {
        BindingKind::ALL
            .iter()
            .any(|&kind| self.contains(name, namespace, kind))
    }

    /// Entries in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&NameKey, usize)> {
        self.entries.iter().map(|(key, slot)| (key, *slot))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

/// Owns a frame's slot table.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    names: Names,
    slots: Vec<Slot>,
    /// Class name assigned by a class builder; `None` for global builders.
    pub classname: Option<QualifiedName>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder for a class frame.
    pub fn for_class(classname: QualifiedName) -> Self {
        Self {
            classname: Some(classname),
            ..Default::default()
        }
    }

    /// Define a binding, allocating a new slot.
    ///
    /// Redefinition of an existing key keeps the original slot and returns its index.
    pub fn define(
        &mut self,
        name: impl Into<String>,
        namespace: Namespace,
        kind: BindingKind,
        slot: Slot,
    ) -> usize {
        let key = NameKey::new(name, namespace, kind);
        if let Some(existing) = self.names.get(&key) {
            return existing;
        }
        let index = self.slots.len();
        self.slots.push(slot);
        self.names.insert(key, index);
        index
    }

    pub fn names(&self) -> &Names {
        &self.names
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Look up the slot bound to `(name, namespace, kind)`.
    pub fn lookup(&self, name: &str, namespace: &Namespace, kind: BindingKind) -> Option<&Slot> {
        self.names
            .get(&NameKey::new(name, namespace.clone(), kind))
            .and_then(|index| self.slots.get(index))
    }

    /// Drop every binding (slots are kept so indexes held elsewhere stay valid).
    pub fn clear_names(&mut self) {
        self.names.clear();
    }
}

/// A scope record: a unit's top-level lexical scope, or a class scope.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub builder: Builder,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builder(builder: Builder) -> Self {
        Self { builder }
    }

    /// Link every binding of `source` not already bound here.
    ///
    /// Linked slots are copies marked `inherited`. Returns the number of
    /// bindings added. Calling this twice for the same pair is harmless for the
    /// name table but the caller must still guard it, since analyzers may
    /// override slot inheritance with non-idempotent behaviour.
    pub fn inherit_from(&mut self, source: &Frame) -> usize {
        let mut added = 0;
        for (key, slot_index) in source.builder.names.iter() {
            if self.builder.names.get(key).is_some() {
                continue;
            }
            let mut slot = source.builder.slots[slot_index].clone();
            slot.inherited = true;
            let index = self.builder.slots.len();
            self.builder.slots.push(slot);
            self.builder.names.insert(key.clone(), index);
            added += 1;
        }
        added
    }
}
