use derive_more::{Display, Error, From};
use miette::Diagnostic;

/// Error type for [`crate::RegistryClient`] operations.
#[derive(Debug, Display, Error, Diagnostic, From)]
#[non_exhaustive]
pub enum RegistryError {
    #[diagnostic(code(snpm_registry::network_error))]
    Network(reqwest::Error),

    #[diagnostic(code(snpm_registry::io_error))]
    Io(std::io::Error),

    #[diagnostic(code(snpm_registry::serialization_error))]
    Serialization(serde_json::Error),

    #[display("`{name}` has no `{tag}` dist-tag")]
    #[diagnostic(code(snpm_registry::missing_dist_tag))]
    #[from(ignore)]
    MissingDistTag { name: String, tag: String },

    #[display("`{name}@{version}` is no longer available on the registry")]
    #[diagnostic(code(snpm_registry::version_gone))]
    #[from(ignore)]
    VersionGone { name: String, version: String },
}
