use crate::RegistryError;
use serde::Deserialize;
use snpm_semver::{max_satisfying, ExactVersion, VersionRange};
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct Dist {
    pub tarball: String,
    pub shasum: Option<String>,
    pub integrity: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PeerDependencyMeta {
    #[serde(default)]
    pub optional: bool,
}

/// A single published version of a package, as returned by the registry.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageVersionInfo {
    pub name: String,
    pub version: String,
    pub dist: Dist,
    #[serde(default)]
    pub dependencies: HashMap<String, String>,
    #[serde(rename = "devDependencies", default)]
    pub dev_dependencies: HashMap<String, String>,
    #[serde(rename = "peerDependencies", default)]
    pub peer_dependencies: HashMap<String, String>,
    #[serde(rename = "peerDependenciesMeta", default)]
    pub peer_dependencies_meta: HashMap<String, PeerDependencyMeta>,
}

/// The registry's full metadata document for one package name: every
/// published version plus its dist-tags. Fetched and memoized once per name
/// by [`crate::RegistryClient`].
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryInfo {
    pub name: String,
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: HashMap<String, String>,
    pub versions: HashMap<String, PackageVersionInfo>,
}

impl RegistryInfo {
    /// All versions that parse as valid semver, in no particular order.
    /// Unparseable keys (rare, malformed registry data) are skipped.
    pub fn parsed_versions(&self) -> impl Iterator<Item = ExactVersion> + '_ {
        self.versions.keys().filter_map(|version| version.parse().ok())
    }

    pub fn version(&self, version: &ExactVersion) -> Option<&PackageVersionInfo> {
        self.versions.get(&version.to_string())
    }

    pub fn resolve_tag(&self, tag: &str) -> Option<ExactVersion> {
        self.dist_tags.get(tag).and_then(|version| version.parse().ok())
    }

    /// The highest published version satisfying `range`. `latest` without a
    /// `dist-tags` entry of that name falls back to `*`.
    pub fn max_satisfying(&self, range: &VersionRange) -> Option<ExactVersion> {
        let candidates: Vec<ExactVersion> = self.parsed_versions().collect();
        max_satisfying(&candidates, range).cloned()
    }

    /// Fails with [`RegistryError::VersionGone`] if `version` was listed by
    /// an earlier fetch but is absent from this snapshot.
    pub fn tarball_url(&self, version: &ExactVersion) -> Result<&str, RegistryError> {
        self.version(version).map(|info| info.dist.tarball.as_str()).ok_or_else(|| {
            RegistryError::VersionGone { name: self.name.clone(), version: version.to_string() }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> RegistryInfo {
        serde_json::from_str(
            r#"{
                "name": "lodash",
                "dist-tags": { "latest": "4.17.21" },
                "versions": {
                    "4.17.20": { "name": "lodash", "version": "4.17.20", "dist": { "tarball": "https://example.test/lodash-4.17.20.tgz" } },
                    "4.17.21": { "name": "lodash", "version": "4.17.21", "dist": { "tarball": "https://example.test/lodash-4.17.21.tgz" } }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn resolves_latest_tag() {
        let info = sample();
        assert_eq!(info.resolve_tag("latest"), Some("4.17.21".parse().unwrap()));
    }

    #[test]
    fn max_satisfying_picks_highest_matching_version() {
        let info = sample();
        let range = VersionRange::parse("^4.17.0").unwrap();
        assert_eq!(info.max_satisfying(&range), Some("4.17.21".parse().unwrap()));
    }

    #[test]
    fn tarball_url_fails_when_version_is_gone() {
        let info = sample();
        let error = info.tarball_url(&"9.9.9".parse().unwrap()).unwrap_err();
        assert!(matches!(error, RegistryError::VersionGone { .. }));
    }
}
