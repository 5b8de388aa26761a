//! Namespaces used as the first half of a qualified name.

use std::fmt;

/// The kind of a namespace.
///
/// Two namespaces with the same name but different kinds are distinct: the
/// internal namespace of package `a.b` does not match its public namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamespaceKind {
    /// Public namespace of a package (the unnamed package when the name is empty).
    Public,
    /// Package-internal namespace.
    Internal,
    /// Class protected namespace.
    Protected,
    /// Class private namespace.
    Private,
    /// User-declared namespace (`namespace foo = "..."`).
    Explicit,
    /// A namespace the parser could not resolve yet.
    ///
    /// `resolved` is set once a later analysis pass has bound it.
    Unresolved { resolved: bool },
}

/// A namespace: a name plus its kind.
///
/// # Example
///
/// ```
/// use asc_core::Namespace;
///
/// let ns = Namespace::public("flash.display");
/// assert_eq!(ns.package_segments().collect::<Vec<_>>(), vec!["flash", "display"]);
/// assert!(Namespace::public("").package_segments().next().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    /// Namespace name (package name for package namespaces).
    pub name: String,
    /// Namespace kind.
    pub kind: NamespaceKind,
}

impl Namespace {
    /// Create a namespace with an explicit kind.
    pub fn new(name: impl Into<String>, kind: NamespaceKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Public namespace of a package.
    pub fn public(package: impl Into<String>) -> Self {
        Self::new(package, NamespaceKind::Public)
    }

    /// Internal namespace of a package.
    pub fn internal(package: impl Into<String>) -> Self {
        Self::new(package, NamespaceKind::Internal)
    }

    /// Private namespace of a class.
    pub fn private(class: impl Into<String>) -> Self {
        Self::new(class, NamespaceKind::Private)
    }

    /// Protected namespace of a class.
    pub fn protected(class: impl Into<String>) -> Self {
        Self::new(class, NamespaceKind::Protected)
    }

    /// User-declared namespace.
    pub fn explicit(uri: impl Into<String>) -> Self {
        Self::new(uri, NamespaceKind::Explicit)
    }

    /// Namespace not yet bound by analysis.
    pub fn unresolved(name: impl Into<String>, resolved: bool) -> Self {
        Self::new(name, NamespaceKind::Unresolved { resolved })
    }

    /// Whether this is an unresolved namespace that analysis has since bound.
    pub fn is_resolved_placeholder(&self) -> bool {
        matches!(self.kind, NamespaceKind::Unresolved { resolved: true })
    }

    /// Package path segments of the namespace name, split on `.`.
    ///
    /// Empty segments are skipped, so the unnamed package yields nothing.
    pub fn package_segments(&self) -> impl Iterator<Item = &str> {
        self.name.split('.').filter(|s| !s.is_empty())
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NamespaceKind::Public if self.name.is_empty() => write!(f, "public"),
            NamespaceKind::Public => write!(f, "{}", self.name),
            NamespaceKind::Internal => write!(f, "internal:{}", self.name),
            NamespaceKind::Protected => write!(f, "protected:{}", self.name),
            NamespaceKind::Private => write!(f, "private:{}", self.name),
            NamespaceKind::Explicit => write!(f, "{}", self.name),
            NamespaceKind::Unresolved { .. } => write!(f, "?{}", self.name),
        }
    }
}
