//! Constant pool for emitted script blocks.

use rustc_hash::FxHashMap;

use asc_core::{NamespaceKind, QualifiedName};

/// Values stored in the constant pool.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int(i64),
    Double(f64),
    String(String),
    /// Qualified name (class and method names, property references).
    Name(QualifiedName),
}

impl Constant {
    const TAG_INT: u8 = 1;
    const TAG_DOUBLE: u8 = 2;
    const TAG_STRING: u8 = 3;
    const TAG_NAME: u8 = 4;

    /// Append the tagged, little-endian encoding.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            Constant::Int(v) => {
                out.push(Self::TAG_INT);
                out.extend_from_slice(&v.to_le_bytes());
            }
            Constant::Double(v) => {
                out.push(Self::TAG_DOUBLE);
                out.extend_from_slice(&v.to_bits().to_le_bytes());
            }
            Constant::String(s) => {
                out.push(Self::TAG_STRING);
                write_str(out, s);
            }
            Constant::Name(name) => {
                out.push(Self::TAG_NAME);
                out.push(namespace_tag(name.namespace.kind));
                write_str(out, &name.namespace.name);
                write_str(out, &name.name);
            }
        }
    }
}

fn write_str(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u32).to_le_bytes());
    out.extend_from_slice(s.as_bytes());
}

fn namespace_tag(kind: NamespaceKind) -> u8 {
    match kind {
        NamespaceKind::Public => 0,
        NamespaceKind::Internal => 1,
        NamespaceKind::Protected => 2,
        NamespaceKind::Private => 3,
        NamespaceKind::Explicit => 4,
        NamespaceKind::Unresolved { .. } => 5,
    }
}

/// Constant pool with deduplication.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    constants: Vec<Constant>,
    index: FxHashMap<ConstantKey, u32>,
}

/// Hashable form of [`Constant`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ConstantKey {
    Int(i64),
    Double(u64), // Bit pattern for hashing
    String(String),
    Name(QualifiedName),
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or get an existing constant, returning its index.
    pub fn add(&mut self, constant: Constant) -> u32 {
        let key = Self::to_key(&constant);

        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }

        let idx = self.constants.len() as u32;
        self.constants.push(constant);
        self.index.insert(key, idx);
        idx
    }

    pub fn add_int(&mut self, value: i64) -> u32 {
        self.add(Constant::Int(value))
    }

    pub fn add_double(&mut self, value: f64) -> u32 {
        self.add(Constant::Double(value))
    }

    pub fn add_string(&mut self, value: impl Into<String>) -> u32 {
        self.add(Constant::String(value.into()))
    }

    pub fn add_name(&mut self, name: QualifiedName) -> u32 {
        self.add(Constant::Name(name))
    }

    pub fn get(&self, index: u32) -> Option<&Constant> {
        self.constants.get(index as usize)
    }

    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    /// Append `u32` count followed by every tagged entry.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.constants.len() as u32).to_le_bytes());
        for constant in &self.constants {
            constant.write_to(out);
        }
    }

    fn to_key(constant: &Constant) -> ConstantKey {
        match constant {
            Constant::Int(v) => ConstantKey::Int(*v),
            Constant::Double(v) => ConstantKey::Double(v.to_bits()),
            Constant::String(s) => ConstantKey::String(s.clone()),
            Constant::Name(n) => ConstantKey::Name(n.clone()),
        }
    }
}
