use clap::Args;
use snpm_package_manager::{install_recursive, uninstall};
use std::path::Path;

/// `snpm uninstall` (aliases `u`, `remove`, `r`): drop one or more packages
/// from `node_modules` and the manifest.
#[derive(Debug, Default, Args)]
pub struct UninstallArgs {
    /// Packages to remove.
    #[arg(value_name = "PACKAGE", required = true)]
    pub packages: Vec<String>,
}

impl UninstallArgs {
    pub async fn run(&self, project_dir: &Path, recursive: bool) -> miette::Result<()> {
        if recursive {
            install_recursive(project_dir, &mut |dir| uninstall(dir, &self.packages))?;
        } else {
            uninstall(project_dir, &self.packages)?;
        }
        Ok(())
    }
}
