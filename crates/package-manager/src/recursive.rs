use crate::InstallError;
use snpm_fs::VisitedPaths;
use std::{fs, path::Path};

/// Depth-first traversal of `root_dir` for `snpm install --recursive`
/// (workspaces): every subdirectory containing its own manifest gets
/// `build_fn` run against it, in depth-first pre-order. `node_modules/`
/// directories and hidden entries (dotfiles, dotdirs) are skipped. A
/// canonicalized-path visited set guards against re-entering a directory
/// reached twice through a symlink cycle.
pub fn install_recursive(
    root_dir: &Path,
    build_fn: &mut dyn FnMut(&Path) -> Result<(), InstallError>,
) -> Result<(), InstallError> {
    let visited = VisitedPaths::new();
    walk(root_dir, &visited, build_fn)
}

fn walk(
    dir: &Path,
    visited: &VisitedPaths,
    build_fn: &mut dyn FnMut(&Path) -> Result<(), InstallError>,
) -> Result<(), InstallError> {
    if !visited.visit(dir) {
        return Ok(());
    }

    if dir.join("package.json").is_file() {
        build_fn(dir)?;
    }

    let Ok(entries) = fs::read_dir(dir) else {
        return Ok(());
    };

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name == "node_modules" || name.starts_with('.') {
            continue;
        }
        walk(&path, visited, build_fn)?;
    }

    Ok(())
}
