use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use derive_more::{Display, Error, From};
use miette::Diagnostic;
use serde::Deserialize;
use serde_json::{Map, Value};
use strum::IntoStaticStr;

/// Error type for [`Manifest`] operations.
#[derive(Debug, Display, Error, From, Diagnostic)]
#[non_exhaustive]
pub enum ManifestError {
    #[diagnostic(code(snpm_manifest::serialization_error))]
    Serialization(serde_json::Error),

    #[diagnostic(code(snpm_manifest::io_error))]
    Io(std::io::Error),

    #[from(ignore)]
    #[display("manifest at {_0:?} is missing a {_1}")]
    MissingField(#[error(not(source))] PathBuf, &'static str),

    #[from(ignore)]
    #[display("the {_1} field must be an object, at {_0:?}")]
    InvalidAttribute(#[error(not(source))] PathBuf, &'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
pub enum DependencyGroup {
    #[strum(serialize = "dependencies")]
    Prod,
    #[strum(serialize = "devDependencies")]
    Dev,
    #[strum(serialize = "optionalDependencies")]
    Optional,
    #[strum(serialize = "peerDependencies")]
    Peer,
}

/// The `bin` field of a manifest: a single executable, or a map of shim name
/// to target file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BinField {
    Single(String),
    Map(BTreeMap<String, String>),
}

/// Content of a manifest file (`package.json`-equivalent) and its path on
/// disk.
///
/// The `dependencies`/`devDependencies` sections are stored as a raw
/// [`Value`] rather than a typed struct, since the manifest carries many
/// fields the core never looks at and round-tripping them verbatim matters
/// more than typed access to all of them.
pub struct Manifest {
    path: PathBuf,
    value: Value,
}

impl Manifest {
    fn default_contents(name: &str) -> Value {
        serde_json::json!({
            "name": name,
            "version": "1.0.0",
        })
    }

    /// Read a manifest that must already exist (a project root). Missing
    /// file is an error.
    pub fn read(project_dir: &Path) -> Result<Manifest, ManifestError> {
        let path = project_dir.join("package.json");
        let contents = fs::read_to_string(&path)?;
        let value = serde_json::from_str(&contents)?;
        Ok(Manifest { path, value })
    }

    /// Read a manifest, creating a minimal `{}`-like one if absent.
    pub fn read_or_init(project_dir: &Path) -> Result<Manifest, ManifestError> {
        let path = project_dir.join("package.json");
        if path.exists() {
            return Self::read(project_dir);
        }
        let name = project_dir.file_name().and_then(|n| n.to_str()).unwrap_or("project");
        let value = Self::default_contents(name);
        let manifest = Manifest { path, value };
        manifest.save()?;
        Ok(manifest)
    }

    /// Read the manifest of a store-bound package. Missing manifest here is
    /// fatal and must name the offending path.
    pub fn read_store_package(package_dir: &Path) -> Result<Manifest, ManifestError> {
        let path = package_dir.join("package.json");
        let contents = fs::read_to_string(&path).map_err(|_| {
            ManifestError::MissingField(package_dir.to_path_buf(), "package.json")
        })?;
        let value = serde_json::from_str(&contents)?;
        Ok(Manifest { path, value })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> Option<&str> {
        self.value.get("name")?.as_str()
    }

    pub fn version(&self) -> Option<&str> {
        self.value.get("version")?.as_str()
    }

    pub fn bin(&self) -> Option<BinField> {
        self.value.get("bin").cloned().and_then(|value| serde_json::from_value(value).ok())
    }

    pub fn dependencies<'a>(
        &'a self,
        groups: impl IntoIterator<Item = DependencyGroup> + 'a,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        groups
            .into_iter()
            .flat_map(|group| self.value.get::<&str>(group.into()))
            .flat_map(|dependencies| dependencies.as_object())
            .flatten()
            .flat_map(|(name, version)| version.as_str().map(|value| (name.as_str(), value)))
    }

    pub fn peer_dependencies_meta(&self) -> impl Iterator<Item = (&str, bool)> {
        self.value
            .get("peerDependenciesMeta")
            .and_then(Value::as_object)
            .into_iter()
            .flatten()
            .map(|(name, meta)| {
                let optional = meta.get("optional").and_then(Value::as_bool).unwrap_or(false);
                (name.as_str(), optional)
            })
    }

    /// Add or overwrite a dependency entry. Does not write to disk; call
    /// [`save`](Self::save) afterwards.
    pub fn add_dependency(
        &mut self,
        name: &str,
        version: &str,
        group: DependencyGroup,
    ) -> Result<(), ManifestError> {
        let group_name: &str = group.into();
        match self.value.get_mut(group_name) {
            Some(field) => {
                field.as_object_mut().ok_or_else(|| {
                    ManifestError::InvalidAttribute(self.path.clone(), group_name)
                })?.insert(name.to_string(), Value::String(version.to_string()));
            }
            None => {
                let mut dependencies = Map::new();
                dependencies.insert(name.to_string(), Value::String(version.to_string()));
                self.value[group_name] = Value::Object(dependencies);
            }
        }
        Ok(())
    }

    /// Remove a dependency entry from both `dependencies` and
    /// `devDependencies`. A no-op if the name isn't present in either.
    pub fn remove_dependency(&mut self, name: &str) {
        for group in [DependencyGroup::Prod, DependencyGroup::Dev] {
            let group_name: &str = group.into();
            if let Some(field) = self.value.get_mut(group_name).and_then(Value::as_object_mut) {
                field.remove(name);
            }
        }
    }

    /// Write the manifest back to disk. `dependencies`/`devDependencies`
    /// keys are sorted alphabetically before serialization; everything else
    /// is written in whatever order it was last read/inserted in.
    pub fn save(&self) -> Result<(), ManifestError> {
        let mut value = self.value.clone();
        for group in [DependencyGroup::Prod, DependencyGroup::Dev] {
            let group_name: &str = group.into();
            if let Some(Value::Object(map)) = value.get_mut(group_name) {
                let sorted: Map<String, Value> = {
                    let mut entries: Vec<_> = map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                    entries.sort_by(|(a, _), (b, _)| a.cmp(b));
                    entries.into_iter().collect()
                };
                *map = sorted;
            }
        }
        let contents = serde_json::to_string_pretty(&value)?;
        let mut file = fs::File::create(&self.path)?;
        file.write_all(contents.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn read_or_init_creates_minimal_manifest() {
        let dir = tempdir().unwrap();
        let manifest = Manifest::read_or_init(dir.path()).unwrap();
        assert!(dir.path().join("package.json").exists());
        assert_eq!(manifest.name(), Some(dir.path().file_name().unwrap().to_str().unwrap()));
    }

    #[test]
    fn add_and_read_dependency() {
        let dir = tempdir().unwrap();
        let mut manifest = Manifest::read_or_init(dir.path()).unwrap();
        manifest.add_dependency("fastify", "^1.0.0", DependencyGroup::Prod).unwrap();
        let dependencies: HashMap<_, _> = manifest.dependencies([DependencyGroup::Prod]).collect();
        assert_eq!(dependencies.get("fastify"), Some(&"^1.0.0"));
    }

    #[test]
    fn save_sorts_dependency_keys() {
        let dir = tempdir().unwrap();
        let mut manifest = Manifest::read_or_init(dir.path()).unwrap();
        manifest.add_dependency("zebra", "*", DependencyGroup::Prod).unwrap();
        manifest.add_dependency("alpha", "*", DependencyGroup::Prod).unwrap();
        manifest.save().unwrap();

        let contents = fs::read_to_string(dir.path().join("package.json")).unwrap();
        let alpha_pos = contents.find("alpha").unwrap();
        let zebra_pos = contents.find("zebra").unwrap();
        assert!(alpha_pos < zebra_pos);
    }

    #[test]
    fn remove_dependency_drops_from_both_groups() {
        let dir = tempdir().unwrap();
        let mut manifest = Manifest::read_or_init(dir.path()).unwrap();
        manifest.add_dependency("fastify", "^1.0.0", DependencyGroup::Dev).unwrap();
        manifest.remove_dependency("fastify");
        assert_eq!(manifest.dependencies([DependencyGroup::Dev]).count(), 0);
    }

    #[test]
    fn reads_peer_dependencies_and_meta() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("package.json");
        fs::write(
            &path,
            r#"{
                "name": "pkg",
                "version": "1.0.0",
                "peerDependencies": { "react": "^18.0.0" },
                "peerDependenciesMeta": { "react": { "optional": true } }
            }"#,
        )
        .unwrap();
        let manifest = Manifest::read(dir.path()).unwrap();
        let peers: HashMap<_, _> = manifest.dependencies([DependencyGroup::Peer]).collect();
        assert_eq!(peers.get("react"), Some(&"^18.0.0"));
        let meta: HashMap<_, _> = manifest.peer_dependencies_meta().collect();
        assert_eq!(meta.get("react"), Some(&true));
    }

    #[test]
    fn reads_bin_field_in_either_form() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("package.json");
        fs::write(&path, r#"{"name": "pkg", "version": "1.0.0", "bin": "./cli.js"}"#).unwrap();
        let manifest = Manifest::read(dir.path()).unwrap();
        assert_eq!(manifest.bin(), Some(BinField::Single("./cli.js".to_string())));
    }

    #[test]
    fn missing_manifest_on_store_package_is_an_error() {
        let dir = tempdir().unwrap();
        let error = Manifest::read_store_package(dir.path()).unwrap_err();
        assert!(matches!(error, ManifestError::MissingField(_, "package.json")));
    }
}
