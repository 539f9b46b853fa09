use crate::{StoreIndex, StoreKey};
use derive_more::{Display, Error, From};
use miette::Diagnostic;
use snpm_dep_spec::{ParsePackageNameError, PackageName};
use snpm_fs::{MoveDirError, VisitedPaths};
use snpm_manifest::{Manifest, ManifestError};
use std::{fs, path::{Path, PathBuf}};

/// Error type of [`StoreDir::absorb`].
#[derive(Debug, Display, Error, Diagnostic, From)]
#[non_exhaustive]
pub enum AbsorbError {
    #[diagnostic(code(snpm_store_dir::io_error))]
    Io(std::io::Error),

    #[display("manifest at {_0:?} is missing name and/or version")]
    #[diagnostic(code(snpm_store_dir::manifest_invalid))]
    #[from(ignore)]
    ManifestInvalid(#[error(not(source))] PathBuf),

    #[diagnostic(code(snpm_store_dir::manifest_read_failed))]
    ManifestRead(ManifestError),

    #[diagnostic(code(snpm_store_dir::bad_package_name))]
    BadPackageName(ParsePackageNameError),

    #[diagnostic(code(snpm_store_dir::move_failed))]
    Move(MoveDirError),
}

/// A directory of installed packages keyed by `name@version`.
///
/// Layout: `<root>/<name>@<version>` for unscoped packages,
/// `<root>/@<scope>/<name>@<version>` for scoped ones. This is a directory-
/// granularity store: it deduplicates whole package versions, not
/// individual file contents.
#[derive(Debug, Clone)]
pub struct StoreDir {
    root: PathBuf,
}

impl StoreDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        StoreDir { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn package_dir(&self, key: &StoreKey) -> PathBuf {
        key.to_path(&self.root)
    }

    /// List direct children of the store directory and build an in-memory
    /// index from their names. A child named `@org` is descended into one
    /// level. Malformed entries (no `@`, empty name, unparseable version)
    /// are silently skipped — they may be in-flight writes from a
    /// concurrent install.
    pub fn scan(&self) -> StoreIndex {
        let index = StoreIndex::new();
        let Ok(entries) = fs::read_dir(&self.root) else {
            return index;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();

            if let Some(scope) = name.strip_prefix('@') {
                let Ok(children) = fs::read_dir(&path) else { continue };
                for child in children.flatten() {
                    let child_name = child.file_name();
                    if let Some(key) = StoreKey::parse_dir_name(Some(scope), &child_name.to_string_lossy()) {
                        index.add(key.name, key.version);
                    }
                }
            } else if let Some(key) = StoreKey::parse_dir_name(None, &name) {
                index.add(key.name, key.version);
            }
        }

        index
    }

    /// Given a directory populated by the bootstrap installer (its own
    /// `node_modules/` layout, possibly with package directories nested
    /// inside each other's `node_modules/`), recursively relocate every
    /// package directory into the store. Returns the keys that were newly
    /// absorbed this call (already-present entries are skipped, their
    /// scratch copy discarded).
    pub fn absorb(
        &self,
        scratch_modules_dir: &Path,
        index: &StoreIndex,
    ) -> Result<Vec<StoreKey>, AbsorbError> {
        let visited = VisitedPaths::new();
        let mut new_keys = Vec::new();
        self.absorb_modules_dir(scratch_modules_dir, &visited, index, &mut new_keys)?;
        Ok(new_keys)
    }

    fn absorb_modules_dir(
        &self,
        modules_dir: &Path,
        visited: &VisitedPaths,
        index: &StoreIndex,
        new_keys: &mut Vec<StoreKey>,
    ) -> Result<(), AbsorbError> {
        let Ok(entries) = fs::read_dir(modules_dir) else {
            return Ok(());
        };

        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if name.starts_with('.') {
                continue;
            }
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            if name.starts_with('@') {
                self.absorb_scope_dir(&path, visited, index, new_keys)?;
            } else {
                self.absorb_package_dir(&path, visited, index, new_keys)?;
            }
        }

        Ok(())
    }

    fn absorb_scope_dir(
        &self,
        scope_dir: &Path,
        visited: &VisitedPaths,
        index: &StoreIndex,
        new_keys: &mut Vec<StoreKey>,
    ) -> Result<(), AbsorbError> {
        let Ok(entries) = fs::read_dir(scope_dir) else {
            return Ok(());
        };
        for entry in entries {
            let entry = entry?;
            if entry.path().is_dir() {
                self.absorb_package_dir(&entry.path(), visited, index, new_keys)?;
            }
        }
        Ok(())
    }

    fn absorb_package_dir(
        &self,
        package_dir: &Path,
        visited: &VisitedPaths,
        index: &StoreIndex,
        new_keys: &mut Vec<StoreKey>,
    ) -> Result<(), AbsorbError> {
        if !visited.visit(package_dir) {
            return Ok(());
        }

        let manifest = Manifest::read_store_package(package_dir).map_err(AbsorbError::ManifestRead)?;
        let (name, version) = manifest
            .name()
            .zip(manifest.version())
            .ok_or_else(|| AbsorbError::ManifestInvalid(package_dir.to_path_buf()))?;
        let package_name = PackageName::parse(name)?;
        let version = version
            .parse()
            .map_err(|_| AbsorbError::ManifestInvalid(package_dir.to_path_buf()))?;
        let key = StoreKey::new(package_name, version);

        index.add(key.name.clone(), key.version.clone());
        let target_path = key.to_path(&self.root);

        if target_path.exists() {
            tracing::debug!(target = %target_path.display(), "store entry already present, discarding scratch copy");
            let nested = package_dir.join("node_modules");
            if nested.is_dir() {
                self.absorb_modules_dir(&nested, visited, index, new_keys)?;
            }
            let _ = fs::remove_dir_all(package_dir);
            return Ok(());
        }

        let had_nested = package_dir.join("node_modules").is_dir();
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent)?;
        }
        tracing::info!(key = %format!("{}@{}", key.name, key.version), "absorbing into store");
        snpm_fs::move_dir(package_dir, &target_path)?;

        if had_nested {
            self.absorb_modules_dir(&target_path.join("node_modules"), visited, index, new_keys)?;
        }
        new_keys.push(key);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn write_package(dir: &Path, name: &str, version: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("package.json"), format!(r#"{{"name":"{name}","version":"{version}"}}"#))
            .unwrap();
    }

    #[test]
    fn scan_finds_unscoped_and_scoped_entries() {
        let store = tempdir().unwrap();
        fs::create_dir_all(store.path().join("lodash@4.17.21")).unwrap();
        fs::create_dir_all(store.path().join("@babel/core@7.0.0")).unwrap();
        let index = StoreDir::new(store.path()).scan();
        assert!(index.any(&PackageName { scope: None, bare: "lodash".to_string() }));
        assert!(index.any(&PackageName { scope: Some("babel".to_string()), bare: "core".to_string() }));
    }

    #[test]
    fn scan_skips_malformed_entries() {
        let store = tempdir().unwrap();
        fs::create_dir_all(store.path().join("not-a-store-entry")).unwrap();
        let index = StoreDir::new(store.path()).scan();
        assert!(!index.any(&PackageName { scope: None, bare: "not-a-store-entry".to_string() }));
    }

    #[test]
    fn absorb_moves_a_simple_package_into_the_store() {
        let scratch = tempdir().unwrap();
        let store = tempdir().unwrap();
        write_package(&scratch.path().join("node_modules/lodash"), "lodash", "4.17.21");

        let store_dir = StoreDir::new(store.path());
        let index = StoreIndex::new();
        let new_keys = store_dir.absorb(&scratch.path().join("node_modules"), &index).unwrap();

        assert_eq!(new_keys.len(), 1);
        assert!(store.path().join("lodash@4.17.21/package.json").exists());
        assert!(!scratch.path().join("node_modules/lodash").exists());
    }

    #[test]
    fn absorb_discards_scratch_copy_when_store_entry_exists() {
        let scratch = tempdir().unwrap();
        let store = tempdir().unwrap();
        write_package(&store.path().join("lodash@4.17.21"), "lodash", "4.17.21");
        write_package(&scratch.path().join("node_modules/lodash"), "lodash", "4.17.21");

        let store_dir = StoreDir::new(store.path());
        let index = StoreIndex::new();
        let new_keys = store_dir.absorb(&scratch.path().join("node_modules"), &index).unwrap();

        assert_eq!(new_keys.len(), 0);
        assert!(!scratch.path().join("node_modules/lodash").exists());
    }

    #[test]
    fn absorb_recurses_into_nested_node_modules() {
        let scratch = tempdir().unwrap();
        let store = tempdir().unwrap();
        write_package(&scratch.path().join("node_modules/outer"), "outer", "1.0.0");
        write_package(
            &scratch.path().join("node_modules/outer/node_modules/inner"),
            "inner",
            "2.0.0",
        );

        let store_dir = StoreDir::new(store.path());
        let index = StoreIndex::new();
        let new_keys = store_dir.absorb(&scratch.path().join("node_modules"), &index).unwrap();

        assert_eq!(new_keys.len(), 2);
        assert!(store.path().join("outer@1.0.0/package.json").exists());
        assert!(store.path().join("inner@2.0.0/package.json").exists());
    }

    #[test]
    fn absorb_rejects_a_manifest_missing_name_or_version() {
        let scratch = tempdir().unwrap();
        let store = tempdir().unwrap();
        let package_dir = scratch.path().join("node_modules/broken");
        fs::create_dir_all(&package_dir).unwrap();
        fs::write(package_dir.join("package.json"), r#"{"version":"1.0.0"}"#).unwrap();

        let store_dir = StoreDir::new(store.path());
        let index = StoreIndex::new();
        let error = store_dir.absorb(&scratch.path().join("node_modules"), &index).unwrap_err();
        assert!(matches!(error, AbsorbError::ManifestInvalid(_)));
    }
}
