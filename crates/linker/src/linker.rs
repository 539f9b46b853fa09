use crate::LinkError;
use dashmap::DashMap;
use snpm_dep_spec::{DependencyValue, LinkSpec, PackageName};
use snpm_fs::{symlink_dir_exists_ok, VisitedPaths};
use snpm_manifest::{DependencyGroup, Manifest};
use snpm_semver::VersionRange;
use snpm_store_dir::{StoreDir, StoreIndex, StoreKey};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

/// One package that received a top-level or transitive link (passes A/B),
/// for the caller to hand off to the executable-shim handler (C9).
#[derive(Debug, Clone)]
pub struct LinkedPackage {
    pub name: PackageName,
    pub package_dir: PathBuf,
}

/// `nodeModulesDir -> (name -> packageDir)`, built incrementally during
/// passes A/B and consulted during pass C to resolve peer dependencies
/// against the parent's own choices.
type LinkTable = HashMap<PackageName, PathBuf>;

/// Builds the visible `node_modules` layout from a store index: top-level
/// links (pass A), transitive links (pass B), and peer-dependency links
/// (pass C).
pub struct Linker<'a> {
    store: &'a StoreDir,
    index: &'a StoreIndex,
}

impl<'a> Linker<'a> {
    pub fn new(store: &'a StoreDir, index: &'a StoreIndex) -> Self {
        Linker { store, index }
    }

    /// Link `manifest`'s dependencies (from `groups`) into
    /// `project_dir/node_modules`, then their transitive dependencies, then
    /// resolve peer dependencies. Returns every package that received a
    /// pass-A/B link (pass-C peer links are pointers to those same packages,
    /// not new installs, so they're excluded — matching the set C9 shims).
    pub fn link_project(
        &self,
        project_dir: &Path,
        manifest: &Manifest,
        groups: &[DependencyGroup],
    ) -> Result<Vec<LinkedPackage>, LinkError> {
        let modules_dir = project_dir.join("node_modules");
        let dep_package_dirs: DashMap<PathBuf, LinkTable> = DashMap::new();
        let linked_deps = VisitedPaths::new();
        let mut linked = Vec::new();

        let dependencies: Vec<(PackageName, DependencyValue)> = manifest
            .dependencies(groups.iter().copied())
            .map(|(name, value)| classify(name, value))
            .collect::<Result<_, _>>()?;

        self.pass_a_b(project_dir, &modules_dir, dependencies, &dep_package_dirs, &linked_deps, &mut linked)?;
        self.pass_c(&dep_package_dirs)?;

        Ok(linked)
    }

    /// Pass A (this directory's own declared dependencies) immediately
    /// followed, per newly linked package, by pass B (its transitive
    /// dependencies) — recursing depth-first. `base_dir` anchors relative
    /// `LinkSpec` paths.
    fn pass_a_b(
        &self,
        base_dir: &Path,
        modules_dir: &Path,
        dependencies: Vec<(PackageName, DependencyValue)>,
        dep_package_dirs: &DashMap<PathBuf, LinkTable>,
        linked_deps: &VisitedPaths,
        linked: &mut Vec<LinkedPackage>,
    ) -> Result<(), LinkError> {
        fs::create_dir_all(modules_dir)?;
        let mut table = LinkTable::new();

        for (name, value) in dependencies {
            let (package_dir, follow_transitive) = match &value {
                DependencyValue::Link(LinkSpec { path }) => (resolve_link_path(base_dir, path), false),
                DependencyValue::Range(range) => (self.resolve_from_store(&name, range)?, true),
            };

            let link_path = package_link_path(modules_dir, &name);
            if !link_path.exists() {
                tracing::debug!(name = %name, target = %package_dir.display(), "linking package");
                symlink_dir_exists_ok(&package_dir, &link_path)?;
            }
            table.insert(name.clone(), package_dir.clone());
            linked.push(LinkedPackage { name: name.clone(), package_dir: package_dir.clone() });

            if follow_transitive && linked_deps.visit(&package_dir) {
                if let Ok(dep_manifest) = Manifest::read_store_package(&package_dir) {
                    let nested_modules_dir = package_dir.join("node_modules");
                    let nested_dependencies: Vec<_> = dep_manifest
                        .dependencies([DependencyGroup::Prod, DependencyGroup::Optional])
                        .map(|(name, value)| classify(name, value))
                        .collect::<Result<_, _>>()?;
                    self.pass_a_b(
                        &package_dir,
                        &nested_modules_dir,
                        nested_dependencies,
                        dep_package_dirs,
                        linked_deps,
                        linked,
                    )?;
                }
            }
        }

        dep_package_dirs.insert(modules_dir.to_path_buf(), table);
        Ok(())
    }

    /// For every linked package that declares peer dependencies, resolve
    /// each peer against the link table of the `node_modules` directory it
    /// was itself linked into, and symlink the parent's choice into the
    /// child's own `node_modules`. Peers absent from the parent's table are
    /// silently skipped. One flat pass over every table built by passes A/B
    /// realizes the recursion: each directory's table is consulted exactly
    /// once, so there is no cycle to guard against here.
    fn pass_c(&self, dep_package_dirs: &DashMap<PathBuf, LinkTable>) -> Result<(), LinkError> {
        for entry in dep_package_dirs.iter() {
            let table = entry.value();
            for (_name, package_dir) in table.iter() {
                let Ok(manifest) = Manifest::read_store_package(package_dir) else { continue };
                let peer_names: std::collections::HashSet<&str> = manifest
                    .dependencies([DependencyGroup::Peer])
                    .map(|(name, _range)| name)
                    .chain(manifest.peer_dependencies_meta().map(|(name, _optional)| name))
                    .collect();
                for peer_name in peer_names {
                    let Ok(peer_name) = peer_name.parse::<PackageName>() else { continue };
                    let Some(peer_package_dir) = table.get(&peer_name) else { continue };

                    let child_modules_dir = package_dir.join("node_modules");
                    fs::create_dir_all(&child_modules_dir)?;
                    let link_path = package_link_path(&child_modules_dir, &peer_name);
                    if !link_path.exists() {
                        tracing::debug!(peer = %peer_name, "linking peer dependency");
                        symlink_dir_exists_ok(peer_package_dir, &link_path)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn resolve_from_store(&self, name: &PackageName, range: &VersionRange) -> Result<PathBuf, LinkError> {
        let version = self
            .index
            .max_satisfying(name, range)
            .ok_or_else(|| LinkError::NoSatisfyingVersion { name: name.to_string() })?;
        Ok(self.store.package_dir(&StoreKey::new(name.clone(), version)))
    }
}

fn classify(name: &str, value: &str) -> Result<(PackageName, DependencyValue), LinkError> {
    let package_name: PackageName = name.parse()?;
    let value = match LinkSpec::parse(value) {
        Some(link) => DependencyValue::Link(link),
        None => DependencyValue::Range(VersionRange::parse(value)?),
    };
    Ok((package_name, value))
}

fn resolve_link_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

fn package_link_path(modules_dir: &Path, name: &PackageName) -> PathBuf {
    match &name.scope {
        Some(scope) => modules_dir.join(format!("@{scope}")).join(&name.bare),
        None => modules_dir.join(&name.bare),
    }
}
