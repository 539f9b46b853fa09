mod error;
mod install;
mod recursive;
mod uninstall;

pub use error::InstallError;
pub use install::{Install, InstallReport};
pub use recursive::install_recursive;
pub use uninstall::uninstall;
