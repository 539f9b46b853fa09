mod bootstrap;
mod client;
mod error;
mod registry_info;
mod unpack;

pub use bootstrap::write_bootstrap_manifest;
pub use client::RegistryClient;
pub use error::RegistryError;
pub use registry_info::{Dist, PackageVersionInfo, PeerDependencyMeta, RegistryInfo};
pub use unpack::{Unpack, UnpackError};
