use snpm_dep_spec::PackageName;
use snpm_semver::ExactVersion;
use std::path::{Path, PathBuf};

/// `packageName@exactVersion`: the unique identity of a store entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    pub name: PackageName,
    pub version: ExactVersion,
}

impl StoreKey {
    pub fn new(name: PackageName, version: ExactVersion) -> Self {
        StoreKey { name, version }
    }

    /// `<storeDir>/<name>@<version>` for unscoped packages,
    /// `<storeDir>/@<scope>/<name>@<version>` for scoped ones.
    pub fn to_path(&self, store_root: &Path) -> PathBuf {
        let dir_name = format!("{}@{}", self.name.bare, self.version);
        match &self.name.scope {
            Some(scope) => store_root.join(format!("@{scope}")).join(dir_name),
            None => store_root.join(dir_name),
        }
    }

    /// Split a terminal directory name (e.g. `lodash@4.17.21`) into
    /// `(bare, version)` on the last `@`. `scope` is the already-descended
    /// `@org` parent, if any. Returns `None` for malformed names (no `@`,
    /// empty bare name, unparseable version) — callers should skip these
    /// silently rather than treat them as fatal, since they may be
    /// in-flight writes.
    pub fn parse_dir_name(scope: Option<&str>, dir_name: &str) -> Option<Self> {
        let at = dir_name.rfind('@')?;
        let (bare, version) = (&dir_name[..at], &dir_name[at + 1..]);
        if bare.is_empty() {
            return None;
        }
        let version: ExactVersion = version.parse().ok()?;
        let name = PackageName { scope: scope.map(str::to_string), bare: bare.to_string() };
        Some(StoreKey { name, version })
    }
}
