use derive_more::{Display, Error, From};
use miette::Diagnostic;
use snpm_dep_spec::{ParseDependencyTokenError, ParsePackageNameError};
use snpm_executor::ExecutorError;
use snpm_linker::LinkError;
use snpm_manifest::ManifestError;
use snpm_registry::RegistryError;
use snpm_semver::RangeParseError;
use snpm_store_dir::AbsorbError;

/// Error type for [`crate::Install::run`] and [`crate::uninstall`].
#[derive(Debug, Display, Error, Diagnostic, From)]
#[non_exhaustive]
pub enum InstallError {
    #[diagnostic(code(snpm_package_manager::io_error))]
    Io(std::io::Error),

    #[diagnostic(code(snpm_package_manager::manifest_error))]
    Manifest(ManifestError),

    #[diagnostic(code(snpm_package_manager::bad_token))]
    BadToken(ParseDependencyTokenError),

    #[diagnostic(code(snpm_package_manager::bad_name))]
    BadName(ParsePackageNameError),

    #[diagnostic(code(snpm_package_manager::bad_range))]
    BadRange(RangeParseError),

    #[diagnostic(code(snpm_package_manager::registry_error))]
    Registry(RegistryError),

    #[diagnostic(code(snpm_package_manager::executor_error))]
    Executor(ExecutorError),

    #[diagnostic(code(snpm_package_manager::absorb_error))]
    Absorb(AbsorbError),

    #[diagnostic(code(snpm_package_manager::link_error))]
    Link(LinkError),

    #[diagnostic(code(snpm_package_manager::shim_error))]
    Shim(snpm_cmd_shim::ShimError),

    #[display("`{name}` has no published versions to install")]
    #[diagnostic(code(snpm_package_manager::no_versions_available))]
    #[from(ignore)]
    NoVersionsAvailable { name: String },
}
