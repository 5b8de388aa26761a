//! Classpath fallback.
//!
//! When no registered unit defines a qualified name, the resolver derives a
//! candidate source path from it and, if a file exists there, admits it as a
//! new unit. This is the only way the unit count grows mid-pipeline. The new
//! unit is not parsed here; the driver parses it on its next iteration.
//!
//! ```text
//! flash.display:Sprite  ->  <root>/flash/display/Sprite.as
//! Foo (unnamed package) ->  <root>/Foo.as
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use asc_core::{QualifiedName, UnitId};
use asc_registry::{Admission, SOURCE_EXTENSION, UnitEmitter, UnitOrigin, UnitRegistry};

/// Maps qualified names to source files under a list of roots.
#[derive(Debug, Clone, Default)]
pub struct ClasspathResolver {
    roots: Vec<PathBuf>,
}

impl ClasspathResolver {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Path relative to a root: namespace segments, then `<name>.as`.
    pub fn relative_path(name: &QualifiedName) -> PathBuf {
        let mut path = PathBuf::new();
        for segment in name.namespace.package_segments() {
            path.push(segment);
        }
        path.push(format!("{}.{}", name.name, SOURCE_EXTENSION));
        path
    }

    /// Candidate files, one per root, in root order.
    pub fn candidates(&self, name: &QualifiedName) -> impl Iterator<Item = PathBuf> + '_ {
        let relative = Self::relative_path(name);
        self.roots.iter().map(move |root| root.join(&relative))
    }

    /// Find a file for `name` and register it.
    ///
    /// Returns the existing id when the file's canonical path is already
    /// registered, so repeated lookups never grow the registry.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn search<E>(
        &self,
        registry: &mut UnitRegistry<E>,
        name: &QualifiedName,
        make_emitter: impl FnOnce(&Path) -> UnitEmitter<E>,
    ) -> Option<UnitId> {
        let mut make_emitter = Some(make_emitter);
        for candidate in self.candidates(name) {
            if !candidate.is_file() {
                continue;
            }
            let canonical = match UnitRegistry::<E>::canonicalize(&candidate) {
                Ok(canonical) => canonical,
                Err(err) => {
                    debug!(%err, "skipping classpath candidate");
                    continue;
                }
            };
            let admission = match registry.index_of(&canonical) {
                Some(existing) => Admission::Existing(existing),
                None => {
                    let make = make_emitter.take()?;
                    registry.admit(canonical, UnitOrigin::Classpath, make)
                }
            };
            if let Admission::New(id) = admission {
                info!(unit = %id, %name, path = %candidate.display(), "admitted from classpath");
            }
            return Some(admission.id());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asc_core::Namespace;
    use tempfile::TempDir;

    fn owned(_: &Path) -> UnitEmitter<()> {
        UnitEmitter::Owned(())
    }

    #[test]
    fn relative_path_follows_package() {
        let name = QualifiedName::new(Namespace::public("flash.display"), "Sprite");
        assert_eq!(
            ClasspathResolver::relative_path(&name),
            Path::new("flash").join("display").join("Sprite.as")
        );
        assert_eq!(
            ClasspathResolver::relative_path(&QualifiedName::global("Foo")),
            PathBuf::from("Foo.as")
        );
    }

    #[test]
    fn search_is_idempotent() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
        std::fs::write(dir.path().join("a/b/C.as"), "").unwrap();

        let resolver = ClasspathResolver::new(vec![dir.path().to_path_buf()]);
        let mut registry = UnitRegistry::new();
        let name = QualifiedName::new(Namespace::public("a.b"), "C");

        let first = resolver.search(&mut registry, &name, owned);
        let second = resolver.search(&mut registry, &name, owned);

        assert_eq!(first, Some(UnitId::new(0)));
        assert_eq!(second, first);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry[UnitId::new(0)].origin, UnitOrigin::Classpath);
    }

    #[test]
    fn roots_are_tried_in_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        std::fs::write(first.path().join("Foo.as"), "").unwrap();
        std::fs::write(second.path().join("Foo.as"), "").unwrap();
        std::fs::write(second.path().join("Bar.as"), "").unwrap();

        let resolver = ClasspathResolver::new(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        let mut registry = UnitRegistry::new();

        let foo = resolver
            .search(&mut registry, &QualifiedName::global("Foo"), owned)
            .unwrap();
        let bar = resolver
            .search(&mut registry, &QualifiedName::global("Bar"), owned)
            .unwrap();

        assert!(registry[foo].path().starts_with(first.path().canonicalize().unwrap()));
        assert!(registry[bar].path().starts_with(second.path().canonicalize().unwrap()));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let resolver = ClasspathResolver::new(vec![dir.path().to_path_buf()]);
        let mut registry: UnitRegistry<()> = UnitRegistry::new();
        assert_eq!(
            resolver.search(&mut registry, &QualifiedName::global("Foo"), owned),
            None
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn directories_are_not_admitted() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("Foo.as")).unwrap();
        let resolver = ClasspathResolver::new(vec![dir.path().to_path_buf()]);
        let mut registry: UnitRegistry<()> = UnitRegistry::new();
        assert_eq!(
            resolver.search(&mut registry, &QualifiedName::global("Foo"), owned),
            None
        );
    }
}
