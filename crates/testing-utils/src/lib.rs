mod cwd;
mod fs;
mod registry;

pub use cwd::{AddDefaultSnpmrc, AddMockedRegistrySnpmrc, CommandTempCwd};
pub use fs::{get_all_folders, get_filenames_in_folder};
pub use registry::MockRegistry;
