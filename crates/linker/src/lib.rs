mod error;
mod linker;

pub use error::LinkError;
pub use linker::{Linker, LinkedPackage};
