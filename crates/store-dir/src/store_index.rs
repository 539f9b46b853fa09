use dashmap::{DashMap, DashSet};
use snpm_dep_spec::PackageName;
use snpm_semver::ExactVersion;

/// In-memory map of `packageName -> set<exactVersion>`, mutated
/// concurrently as new packages land during one run.
///
/// Lock-striped via `dashmap` rather than a single mutex, matching the
/// "mutex-protected... or lock-striped" allowance for the thread-pool
/// realization.
#[derive(Debug, Default)]
pub struct StoreIndex {
    versions: DashMap<PackageName, DashSet<ExactVersion>>,
}

impl StoreIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent: adding an already-present `(name, version)` is a no-op.
    pub fn add(&self, name: PackageName, version: ExactVersion) {
        self.versions.entry(name).or_default().insert(version);
    }

    pub fn has(&self, name: &PackageName, version: &ExactVersion) -> bool {
        self.versions.get(name).is_some_and(|versions| versions.contains(version))
    }

    pub fn versions(&self, name: &PackageName) -> Vec<ExactVersion> {
        self.versions.get(name).map(|versions| versions.iter().map(|v| v.clone()).collect()).unwrap_or_default()
    }

    pub fn any(&self, name: &PackageName) -> bool {
        self.versions.get(name).is_some_and(|versions| !versions.is_empty())
    }

    /// The highest version of `name` satisfying `range`, if any is cached.
    pub fn max_satisfying(
        &self,
        name: &PackageName,
        range: &snpm_semver::VersionRange,
    ) -> Option<ExactVersion> {
        let versions = self.versions(name);
        snpm_semver::max_satisfying(&versions, range).cloned()
    }
}
