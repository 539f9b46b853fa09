use crate::InstallError;
use snpm_dep_spec::PackageName;
use snpm_manifest::Manifest;
use std::{fs, path::Path};

/// `snpm uninstall`: remove each name's `node_modules/<name>` entry
/// (recursively) and drop its key from the manifest's `dependencies` and
/// `devDependencies`. Does not touch the store — other projects may still
/// reference the same store entry.
pub fn uninstall(project_dir: &Path, names: &[String]) -> Result<(), InstallError> {
    let mut manifest = Manifest::read(project_dir)?;
    unlink(&project_dir.join("node_modules"), names)?;
    for name in names {
        manifest.remove_dependency(name);
    }
    manifest.save()?;
    Ok(())
}

/// Remove the `node_modules` entry for each name, if present. Shared by
/// [`uninstall`] and [`crate::Install::run`]'s own `remove` list.
pub(crate) fn unlink(modules_dir: &Path, names: &[String]) -> Result<(), InstallError> {
    for name in names {
        let package_name = PackageName::parse(name.as_str())?;
        let path = match &package_name.scope {
            Some(scope) => modules_dir.join(format!("@{scope}")).join(&package_name.bare),
            None => modules_dir.join(&package_name.bare),
        };
        if path.exists() {
            tracing::info!(name, "removing linked package");
            fs::remove_dir_all(&path)?;
        }
    }
    Ok(())
}
