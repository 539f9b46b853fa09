use crate::{uninstall::unlink, InstallError};
use snpm_cmd_shim::{install_all, ShimCache, ShimTarget};
use snpm_config::Config;
use snpm_dep_spec::{expand_shorthand, parse_dependency_token, DependencyValue, LinkSpec, PackageName};
use snpm_executor::run_bootstrap_install;
use snpm_linker::{Linker, LinkedPackage};
use snpm_manifest::{DependencyGroup, Manifest};
use snpm_registry::{write_bootstrap_manifest, RegistryClient};
use snpm_semver::VersionRange;
use snpm_store_dir::StoreDir;
use std::{fs, path::Path};

/// Everything one `snpm install`/`snpm add`/`snpm remove` invocation needs to
/// do in a single project directory: resolve/create the store, merge the
/// requested changes into the manifest, bootstrap anything the store
/// doesn't already have, then run the symlink planner and shim handler.
#[must_use]
pub struct Install<'a> {
    pub project_dir: &'a Path,
    pub config: &'a Config,
    pub registry: &'a RegistryClient,
    /// Dependency groups to resolve and link (prod only, or prod + dev).
    pub dependency_groups: &'a [DependencyGroup],
    /// Dependency tokens to add (`name`, `name@range`, `name@link:path`, ...).
    pub add: &'a [String],
    /// Group newly-added tokens are recorded under.
    pub save_group: DependencyGroup,
    /// Names to remove from the manifest and unlink before resolving.
    pub remove: &'a [String],
    /// Binary of the external package manager invoked in bootstrap mode
    /// (e.g. `"npm"`) when a dependency has no match in the store.
    pub bootstrap_binary: &'a str,
}

/// Summary of one [`Install::run`] call, for the CLI to report.
#[derive(Debug, Default)]
pub struct InstallReport {
    pub linked: Vec<LinkedPackage>,
    pub newly_absorbed: usize,
}

impl<'a> Install<'a> {
    pub async fn run(self) -> Result<InstallReport, InstallError> {
        let Install { project_dir, config, registry, dependency_groups, add, save_group, remove, bootstrap_binary } =
            self;

        // 1. Resolve/create storeDir.
        fs::create_dir_all(&config.store_dir)?;
        let store = StoreDir::new(&config.store_dir);

        // 2. Scan store into index.
        let index = store.scan();

        // 3. Ensure the project has a manifest.
        let mut manifest = Manifest::read_or_init(project_dir)?;

        // 4. Merge CLI instructions.
        if !remove.is_empty() {
            unlink(&project_dir.join("node_modules"), remove)?;
            for name in remove {
                manifest.remove_dependency(name);
            }
        }

        for token in add {
            if let Some(targets) = expand_shorthand(token) {
                for target in targets {
                    let recorded = format!("^{}", highest_available(registry, &target.name).await?);
                    let group = if target.force_dev { DependencyGroup::Dev } else { save_group };
                    manifest.add_dependency(&target.name.to_string(), &recorded, group)?;
                }
                continue;
            }

            let (name, value) = parse_dependency_token(token)?;
            let recorded = match &value {
                DependencyValue::Link(LinkSpec { path }) => format!("link:{}", path.display()),
                DependencyValue::Range(VersionRange::Star) => {
                    format!("^{}", highest_available(registry, &name).await?)
                }
                DependencyValue::Range(_) => literal_range(token, &name).to_string(),
            };
            manifest.add_dependency(&name.to_string(), &recorded, save_group)?;
        }

        // For every currently-declared dependency (pre-existing and just
        // added), resolve a store match now: found, with no explicit range,
        // records the version actually chosen; not found, queue a bootstrap.
        let declared: Vec<(String, String)> = manifest
            .dependencies(dependency_groups.iter().copied())
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        let mut new_deps: Vec<(PackageName, String)> = Vec::new();
        for (name_str, value_str) in declared {
            if LinkSpec::parse(&value_str).is_some() {
                continue;
            }
            let package_name: PackageName = name_str.parse()?;
            let range = VersionRange::parse(&value_str)?;
            match index.max_satisfying(&package_name, &range) {
                Some(version) if range == VersionRange::Star => {
                    manifest.add_dependency(&name_str, &format!("^{version}"), save_group)?;
                }
                Some(_) => {}
                None => new_deps.push((package_name, value_str)),
            }
        }
        manifest.save()?;

        // 5. Bootstrap + absorb new deps, if any.
        let mut newly_absorbed = 0;
        if !new_deps.is_empty() {
            let scratch_dir = project_dir.join("node_modules").join(".tmp");
            tracing::info!(count = new_deps.len(), "bootstrapping new dependencies");
            write_bootstrap_manifest(&scratch_dir, &new_deps)?;
            run_bootstrap_install(bootstrap_binary, &scratch_dir, config.legacy_peer_deps)?;
            let absorbed = store.absorb(&scratch_dir.join("node_modules"), &index)?;
            newly_absorbed = absorbed.len();
            // Best-effort: a leftover `.tmp/` doesn't affect correctness.
            let _ = fs::remove_dir_all(&scratch_dir);
        }

        // 6-8. Symlink planner: passes A, B, C.
        tracing::info!("linking dependencies");
        let linker = Linker::new(&store, &index);
        let linked = linker.link_project(project_dir, &manifest, dependency_groups)?;

        // 9. Executable shims for every pass-A/B package declaring `bin`.
        let bin_dir = project_dir.join("node_modules").join(".bin");
        let cache = ShimCache::new();
        let bins: Vec<(String, std::path::PathBuf, snpm_manifest::BinField)> = linked
            .iter()
            .filter_map(|package| {
                let package_manifest = Manifest::read_store_package(&package.package_dir).ok()?;
                let bin = package_manifest.bin()?;
                Some((package.name.bare.clone(), package.package_dir.clone(), bin))
            })
            .collect();
        let shim_targets: Vec<ShimTarget> = bins
            .iter()
            .map(|(name, dir, bin)| ShimTarget { name: name.as_str(), package_dir: dir.as_path(), bin })
            .collect();
        if !shim_targets.is_empty() {
            install_all(&shim_targets, &bin_dir, &cache)?;
        }

        Ok(InstallReport { linked, newly_absorbed })
    }
}

async fn highest_available(
    registry: &RegistryClient,
    name: &PackageName,
) -> Result<snpm_semver::ExactVersion, InstallError> {
    let mut versions = registry.available_versions(name).await?;
    versions.sort();
    versions.pop().ok_or_else(|| InstallError::NoVersionsAvailable { name: name.to_string() })
}

/// The range half of `token`, as the user literally wrote it (everything
/// after `name@`). Falls back to `"*"` for a bare name with no range.
fn literal_range<'t>(token: &'t str, name: &PackageName) -> &'t str {
    token.strip_prefix(name.to_string().as_str()).and_then(|rest| rest.strip_prefix('@')).unwrap_or("*")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn write_store_package(store_root: &Path, dir_name: &str, name: &str, version: &str) {
        let dir = store_root.join(dir_name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("package.json"), format!(r#"{{"name":"{name}","version":"{version}"}}"#)).unwrap();
    }

    #[tokio::test]
    async fn links_a_dependency_already_present_in_the_store_without_bootstrapping() {
        let store_root = tempdir().unwrap();
        let project = tempdir().unwrap();
        write_store_package(store_root.path(), "lodash@4.17.21", "lodash", "4.17.21");
        fs::write(
            project.path().join("package.json"),
            r#"{"name": "app", "version": "1.0.0", "dependencies": {"lodash": "^4.0.0"}}"#,
        )
        .unwrap();

        let config = Config { store_dir: store_root.path().to_path_buf(), ..Config::new() };
        let registry = RegistryClient::new("https://registry.example.test");

        let report = Install {
            project_dir: project.path(),
            config: &config,
            registry: &registry,
            dependency_groups: &[DependencyGroup::Prod],
            add: &[],
            save_group: DependencyGroup::Prod,
            remove: &[],
            bootstrap_binary: "npm",
        }
        .run()
        .await
        .unwrap();

        assert_eq!(report.linked.len(), 1);
        assert_eq!(report.newly_absorbed, 0);
        assert!(project.path().join("node_modules/lodash").is_symlink());
    }

    #[test]
    fn literal_range_extracts_the_range_half_of_a_token() {
        let name = PackageName { scope: None, bare: "lodash".to_string() };
        assert_eq!(literal_range("lodash@^4.0.0", &name), "^4.0.0");
        let scoped = PackageName { scope: Some("babel".to_string()), bare: "core".to_string() };
        assert_eq!(literal_range("@babel/core@^7.0.0", &scoped), "^7.0.0");
    }
}
