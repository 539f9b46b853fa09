use derive_more::{Display, Error, From};
use miette::Diagnostic;
use snpm_dep_spec::ParsePackageNameError;
use snpm_semver::RangeParseError;

#[derive(Debug, Display, Error, Diagnostic, From)]
#[non_exhaustive]
pub enum LinkError {
    #[diagnostic(code(snpm_linker::io_error))]
    Io(std::io::Error),

    #[diagnostic(code(snpm_linker::bad_name))]
    BadName(ParsePackageNameError),

    #[diagnostic(code(snpm_linker::bad_range))]
    BadRange(RangeParseError),

    #[display("no version of `{name}` in the store satisfies its declared range")]
    #[diagnostic(code(snpm_linker::no_satisfying_version))]
    #[from(ignore)]
    NoSatisfyingVersion { name: String },
}
