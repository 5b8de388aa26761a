use std::fmt;

use crate::Namespace;

/// Qualified name: the resolution key for classes and definitions.
///
/// Equality is structural over the namespace (name and kind) and the local name.
///
/// # Examples
///
/// ```
/// use asc_core::{Namespace, QualifiedName};
///
/// let sprite = QualifiedName::new(Namespace::public("flash.display"), "Sprite");
/// assert_eq!(sprite.to_string(), "flash.display:Sprite");
///
/// let top = QualifiedName::global("Object");
/// assert_eq!(top.to_string(), "Object");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    /// Namespace the name is declared in.
    pub namespace: Namespace,
    /// Local (simple) name.
    pub name: String,
}

impl QualifiedName {
    /// Create a new qualified name.
    pub fn new(namespace: Namespace, name: impl Into<String>) -> Self {
        Self {
            namespace,
            name: name.into(),
        }
    }

    /// Create a name in the public namespace of the unnamed package.
    pub fn global(name: impl Into<String>) -> Self {
        Self::new(Namespace::public(""), name)
    }

    /// Create from a `package:Name` or `package.Name` string in the public namespace.
    ///
    /// The last `:` wins if present, otherwise the last `.`.
    pub fn from_qualified_string(s: &str) -> Self {
        let split = s.rfind(':').or_else(|| s.rfind('.'));
        match split {
            Some(at) => Self::new(Namespace::public(&s[..at]), &s[at + 1..]),
            None => Self::global(s),
        }
    }

    /// Get the simple (unqualified) name.
    pub fn simple_name(&self) -> &str {
        &self.name
    }

    /// Whether the name lives in the public namespace of the unnamed package.
    pub fn is_global(&self) -> bool {
        self.namespace == Namespace::public("")
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_global() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.namespace, self.name)
        }
    }
}

impl From<&str> for QualifiedName {
    fn from(s: &str) -> Self {
        Self::from_qualified_string(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_name() {
        let name = QualifiedName::global("Foo");
        assert!(name.is_global());
        assert_eq!(name.to_string(), "Foo");
    }

    #[test]
    fn from_qualified_string() {
        let colon = QualifiedName::from_qualified_string("flash.display:Sprite");
        let dotted = QualifiedName::from_qualified_string("flash.display.Sprite");
        assert_eq!(colon, dotted);
        assert_eq!(colon.namespace.name, "flash.display");
        assert_eq!(colon.name, "Sprite");

        let bare = QualifiedName::from_qualified_string("int");
        assert!(bare.is_global());
    }

    #[test]
    fn equality_includes_namespace_kind() {
        let public = QualifiedName::new(Namespace::public("util"), "Helper");
        let internal = QualifiedName::new(Namespace::internal("util"), "Helper");
        assert_ne!(public, internal);
    }
}
