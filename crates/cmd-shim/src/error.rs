use derive_more::{Display, Error, From};
use miette::Diagnostic;

/// Error type for [`crate::install_shims`] and [`crate::install_all`].
#[derive(Debug, Display, Error, Diagnostic, From)]
#[non_exhaustive]
pub enum ShimError {
    #[diagnostic(code(snpm_cmd_shim::io_error))]
    Io(std::io::Error),
}
