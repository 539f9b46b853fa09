use derive_more::{Display, Error};
use miette::Diagnostic;
use std::path::Path;

/// Error a concrete [`Unpack`] implementation may report.
#[derive(Debug, Display, Error, Diagnostic)]
#[display("failed to unpack tarball into {dest:?}: {message}")]
#[diagnostic(code(snpm_registry::unpack_failed))]
pub struct UnpackError {
    dest: std::path::PathBuf,
    message: String,
}

impl UnpackError {
    pub fn new(dest: impl Into<std::path::PathBuf>, message: impl Into<String>) -> Self {
        UnpackError { dest: dest.into(), message: message.into() }
    }
}

/// Decompresses and extracts a downloaded tarball into `dest`.
///
/// Kept abstract: direct-fetch mode needs this to materialize a package
/// from its registry tarball, but no concrete gzip/tar implementation is
/// wired into the core. Callers supply one (a real implementation for a
/// CLI binary, a fake one for tests).
pub trait Unpack: Send + Sync {
    fn unpack(&self, tarball: &[u8], dest: &Path) -> Result<(), UnpackError>;
}
