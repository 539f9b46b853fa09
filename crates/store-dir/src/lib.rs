mod store_dir;
mod store_index;
mod store_key;

pub use store_dir::*;
pub use store_index::*;
pub use store_key::*;
