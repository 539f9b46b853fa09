mod atomic_rename;
mod file_mode;
mod visited_paths;

pub use atomic_rename::{move_dir, MoveDirError};
pub use file_mode::{is_all_exec, make_file_executable, EXEC_MASK, EXEC_MODE};
pub use visited_paths::VisitedPaths;

use derive_more::{Display, Error};
use miette::Diagnostic;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Create a symlink to a directory.
///
/// The `link` path will be a symbolic link pointing to `original`.
pub fn symlink_dir(original: &Path, link: &Path) -> io::Result<()> {
    #[cfg(unix)]
    return std::os::unix::fs::symlink(original, link);
    #[cfg(windows)]
    return junction::create(original, link); // junctions instead of symlinks because symlinks may require elevated privileges.
}

/// Like [`symlink_dir`], but treats an already-existing link at `link` as
/// success rather than an error.
///
/// Concurrent link-planner passes may race to create the same link (e.g. two
/// dependents of the same transitive dependency); the loser of that race
/// should not fail the whole install.
pub fn symlink_dir_exists_ok(original: &Path, link: &Path) -> io::Result<()> {
    match symlink_dir(original, link) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(error) => Err(error),
    }
}

/// Create a symlink to a single file (as opposed to [`symlink_dir`], which
/// targets a directory). Distinct on Windows, where a directory junction
/// cannot point at a file; symlinks are untyped on Unix, so the two only
/// diverge there.
pub fn symlink_file(original: &Path, link: &Path) -> io::Result<()> {
    #[cfg(unix)]
    return std::os::unix::fs::symlink(original, link);
    #[cfg(windows)]
    return std::os::windows::fs::symlink_file(original, link);
}

/// Like [`symlink_file`], but treats an already-existing link at `link` as
/// success rather than an error. See [`symlink_dir_exists_ok`].
pub fn symlink_file_exists_ok(original: &Path, link: &Path) -> io::Result<()> {
    match symlink_file(original, link) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(error) => Err(error),
    }
}

/// Error type of [`ensure_file`].
#[derive(Debug, Display, Error, Diagnostic)]
pub enum EnsureFileError {
    #[display("Failed to create the parent directory at {parent_dir:?}: {error}")]
    CreateDir {
        parent_dir: PathBuf,
        #[error(source)]
        error: io::Error,
    },
    #[display("Failed to write to file at {file_path:?}: {error}")]
    WriteFile {
        file_path: PathBuf,
        #[error(source)]
        error: io::Error,
    },
}

/// Write `content` to `file_path` unless it already exists.
///
/// Ancestor directories will be created if they don't already exist.
pub fn ensure_file(file_path: &Path, content: &[u8]) -> Result<(), EnsureFileError> {
    if file_path.exists() {
        return Ok(());
    }

    let parent_dir = file_path.parent().unwrap();
    fs::create_dir_all(parent_dir).map_err(|error| EnsureFileError::CreateDir {
        parent_dir: parent_dir.to_path_buf(),
        error,
    })?;
    fs::write(file_path, content)
        .map_err(|error| EnsureFileError::WriteFile { file_path: file_path.to_path_buf(), error })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_file_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("file.txt");
        ensure_file(&path, b"content").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"content");
        // second call must not touch an existing file
        ensure_file(&path, b"ignored").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"content");
    }

    #[cfg(unix)]
    #[test]
    fn symlink_dir_exists_ok_tolerates_race() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target");
        let link = dir.path().join("link");
        fs::create_dir(&target).unwrap();
        symlink_dir_exists_ok(&target, &link).unwrap();
        symlink_dir_exists_ok(&target, &link).unwrap();
        assert!(link.is_symlink());
    }

    #[cfg(unix)]
    #[test]
    fn symlink_file_exists_ok_tolerates_race() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target.js");
        let link = dir.path().join("link");
        fs::write(&target, b"module.exports = {}").unwrap();
        symlink_file_exists_ok(&target, &link).unwrap();
        symlink_file_exists_ok(&target, &link).unwrap();
        assert!(link.is_symlink());
    }
}
