//! Unresolved symbol references produced by the parser and flow analyzer.

use std::fmt;

use crate::{Namespace, QualifiedName, Span};

/// A reference that could not be bound inside its own unit.
///
/// Each reference carries a bare name and an ordered list of candidate
/// namespaces (open namespaces first, then public). Resolution tries the
/// candidates in order and the first one that finds a defining unit wins.
///
/// # Example
///
/// ```
/// use asc_core::{Namespace, UnresolvedReference};
///
/// let r = UnresolvedReference::new("Sprite")
///     .with_namespace(Namespace::public("flash.display"))
///     .with_namespace(Namespace::public(""));
/// let names: Vec<String> = r.candidates().map(|q| q.to_string()).collect();
/// assert_eq!(names, vec!["flash.display:Sprite", "Sprite"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnresolvedReference {
    /// The referenced name as written.
    pub name: String,
    /// Candidate namespaces, in priority order.
    pub namespaces: Vec<Namespace>,
    /// Where the reference appears.
    pub span: Span,
    /// Attribute identifier (`@name`) reference.
    pub is_attribute: bool,
}

impl UnresolvedReference {
    /// Create a reference with no candidate namespaces.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Append a candidate namespace.
    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespaces.push(namespace);
        self
    }

    /// Replace the candidate namespaces.
    pub fn with_namespaces(mut self, namespaces: Vec<Namespace>) -> Self {
        self.namespaces = namespaces;
        self
    }

    /// Set the source span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Mark as an attribute identifier reference.
    pub fn attribute(mut self) -> Self {
        self.is_attribute = true;
        self
    }

    /// Qualified names to try, in namespace order.
    pub fn candidates(&self) -> impl Iterator<Item = QualifiedName> + '_ {
        self.namespaces
            .iter()
            .map(|ns| QualifiedName::new(ns.clone(), self.name.clone()))
    }

    /// Multiname rendering used in diagnostics: `[ns1, ns2]::name`.
    pub fn to_multiname(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, ns) in self.namespaces.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", ns)?;
        }
        write!(f, "]::{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiname_lists_namespaces_in_order() {
        let r = UnresolvedReference::new("Foo")
            .with_namespace(Namespace::internal("app"))
            .with_namespace(Namespace::public(""));
        assert_eq!(r.to_multiname(), "[internal:app, public]::Foo");
    }

    #[test]
    fn reference_without_namespaces_has_no_candidates() {
        let r = UnresolvedReference::new("Foo");
        assert_eq!(r.candidates().count(), 0);
        assert_eq!(r.to_multiname(), "[]::Foo");
    }

    #[test]
    fn attribute_flag() {
        let r = UnresolvedReference::new("id").attribute();
        assert!(r.is_attribute);
    }
}
