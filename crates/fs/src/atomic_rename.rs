use derive_more::{Display, Error};
use miette::Diagnostic;
use std::{fs, io, path::Path};

/// Error type of [`move_dir`].
#[derive(Debug, Display, Error, Diagnostic)]
#[display("Failed to move {from:?} to {to:?}: {error}")]
#[diagnostic(code(snpm_fs::move_dir_failed))]
pub struct MoveDirError {
    from: std::path::PathBuf,
    to: std::path::PathBuf,
    #[error(source)]
    error: io::Error,
}

/// Move a directory from `from` to `to`, preferring an atomic rename.
///
/// When `from` and `to` live on the same filesystem, this is a single
/// `rename(2)` and therefore atomic with respect to concurrent readers of
/// `to`. When they don't (`EXDEV`), falls back to a recursive copy followed
/// by removal of the source, which is no longer atomic but is the only
/// option across filesystem boundaries.
///
/// A target directory that already exists and is non-empty (`ENOTEMPTY` /
/// `EEXIST`, depending on platform) is tolerated: another concurrent
/// materialization of the same store entry is assumed to have won the race,
/// and `from` is removed instead of left behind as scratch garbage.
pub fn move_dir(from: &Path, to: &Path) -> Result<(), MoveDirError> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(error) if is_not_empty(&error) => {
            let _ = fs::remove_dir_all(from);
            Ok(())
        }
        Err(error) if error.raw_os_error() == Some(libc::EXDEV) => {
            copy_dir_all(from, to)
                .map_err(|error| MoveDirError { from: from.to_path_buf(), to: to.to_path_buf(), error })?;
            fs::remove_dir_all(from)
                .map_err(|error| MoveDirError { from: from.to_path_buf(), to: to.to_path_buf(), error })
        }
        Err(error) => {
            Err(MoveDirError { from: from.to_path_buf(), to: to.to_path_buf(), error })
        }
    }
}

fn is_not_empty(error: &io::Error) -> bool {
    matches!(error.raw_os_error(), Some(libc::ENOTEMPTY) | Some(libc::EEXIST))
}

#[cfg(unix)]
mod libc {
    pub const ENOTEMPTY: i32 = 39;
    pub const EEXIST: i32 = 17;
    pub const EXDEV: i32 = 18;
}

#[cfg(not(unix))]
mod libc {
    pub const ENOTEMPTY: i32 = 41;
    pub const EEXIST: i32 = 17;
    pub const EXDEV: i32 = 17;
}

fn copy_dir_all(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let dest = to.join(entry.file_name());
        if file_type.is_dir() {
            copy_dir_all(&entry.path(), &dest)?;
        } else if file_type.is_symlink() {
            let target = fs::read_link(entry.path())?;
            super::symlink_dir(&target, &dest)?;
        } else {
            fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}
