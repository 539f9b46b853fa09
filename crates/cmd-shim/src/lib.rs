mod error;
mod shim;

pub use error::ShimError;
pub use shim::{install_all, install_shims, ShimCache, ShimTarget};
