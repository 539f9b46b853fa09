use crate::RegistryError;
use serde_json::{Map, Value};
use snpm_dep_spec::PackageName;
use std::{fs, path::Path};

/// Writes a scratch `package.json` listing only `dependencies` into
/// `scratch_dir`, for bootstrap mode (4.5): an external package-manager
/// binary is then invoked against this directory, and its `node_modules/`
/// output is absorbed into the store.
pub fn write_bootstrap_manifest(
    scratch_dir: &Path,
    dependencies: &[(PackageName, String)],
) -> Result<(), RegistryError> {
    fs::create_dir_all(scratch_dir)?;

    let mut deps = Map::new();
    for (name, range) in dependencies {
        deps.insert(name.to_string(), Value::String(range.clone()));
    }
    let manifest = serde_json::json!({
        "name": "snpm-bootstrap-scratch",
        "version": "0.0.0",
        "dependencies": Value::Object(deps),
    });

    fs::write(scratch_dir.join("package.json"), serde_json::to_vec_pretty(&manifest)?)?;
    Ok(())
}
