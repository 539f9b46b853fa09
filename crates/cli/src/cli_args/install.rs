use clap::Args;
use snpm_config::Config;
use snpm_manifest::DependencyGroup;
use snpm_package_manager::{install_recursive, Install, InstallError};
use snpm_registry::RegistryClient;
use std::path::Path;

/// `snpm install` (aliases `i`, `add`, `a`): install every declared
/// dependency, optionally adding new packages named on the command line
/// first.
#[derive(Debug, Default, Args)]
pub struct InstallArgs {
    /// Packages to add, e.g. `snpm add lodash` or `snpm add lodash@^4.0.0`.
    /// With none given, this just installs what the manifest already
    /// declares.
    #[arg(value_name = "PACKAGE")]
    pub packages: Vec<String>,

    /// Only install production dependencies.
    #[arg(long)]
    pub prod: bool,

    /// Only install development dependencies.
    #[arg(long)]
    pub dev: bool,

    /// Record newly added packages under `devDependencies`.
    #[arg(short = 'D', long = "save-dev")]
    pub save_dev: bool,

    /// Record newly added packages under `dependencies` (the default).
    #[arg(short = 'P', long = "save-prod")]
    pub save_prod: bool,
}

impl InstallArgs {
    /// Which manifest dependency groups get installed. `--dev`/`--prod`
    /// narrow this; with neither (or both), everything installs.
    pub fn dependency_groups(&self) -> Vec<DependencyGroup> {
        match (self.prod, self.dev) {
            (true, false) => vec![DependencyGroup::Prod],
            (false, true) => vec![DependencyGroup::Dev],
            _ => vec![DependencyGroup::Prod, DependencyGroup::Dev, DependencyGroup::Optional],
        }
    }

    /// Which manifest field newly added packages are recorded under.
    pub fn save_group(&self) -> DependencyGroup {
        if self.save_dev && !self.save_prod {
            DependencyGroup::Dev
        } else {
            DependencyGroup::Prod
        }
    }

    pub async fn run(
        &self,
        project_dir: &Path,
        config: &Config,
        registry: &RegistryClient,
        recursive: bool,
    ) -> miette::Result<()> {
        let groups = self.dependency_groups();
        let save_group = self.save_group();

        if recursive {
            install_recursive(project_dir, &mut |dir| {
                tokio::task::block_in_place(|| {
                    tokio::runtime::Handle::current().block_on(self.run_one(dir, config, registry, &groups, save_group))
                })
            })?;
        } else {
            self.run_one(project_dir, config, registry, &groups, save_group).await?;
        }

        Ok(())
    }

    async fn run_one(
        &self,
        project_dir: &Path,
        config: &Config,
        registry: &RegistryClient,
        groups: &[DependencyGroup],
        save_group: DependencyGroup,
    ) -> Result<(), InstallError> {
        let report = Install {
            project_dir,
            config,
            registry,
            dependency_groups: groups,
            add: &self.packages,
            save_group,
            remove: &[],
            bootstrap_binary: "npm",
        }
        .run()
        .await?;
        tracing::info!(
            linked = report.linked.len(),
            newly_absorbed = report.newly_absorbed,
            dir = %project_dir.display(),
            "install complete"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn dependency_options_to_dependency_groups() {
        macro_rules! case {
            ($prod:expr, $dev:expr => $expected:expr) => {
                let args = InstallArgs { prod: $prod, dev: $dev, ..Default::default() };
                assert_eq!(args.dependency_groups(), $expected, "prod={} dev={}", $prod, $dev);
            };
        }

        case!(false, false => vec![DependencyGroup::Prod, DependencyGroup::Dev, DependencyGroup::Optional]);
        case!(true, false => vec![DependencyGroup::Prod]);
        case!(false, true => vec![DependencyGroup::Dev]);
        case!(true, true => vec![DependencyGroup::Prod, DependencyGroup::Dev, DependencyGroup::Optional]);
    }

    #[test]
    fn save_dev_flag_picks_the_save_group() {
        macro_rules! case {
            ($save_dev:expr, $save_prod:expr => $expected:expr) => {
                let args = InstallArgs { save_dev: $save_dev, save_prod: $save_prod, ..Default::default() };
                assert_eq!(args.save_group(), $expected);
            };
        }

        case!(false, false => DependencyGroup::Prod);
        case!(true, false => DependencyGroup::Dev);
        case!(false, true => DependencyGroup::Prod);
        case!(true, true => DependencyGroup::Prod);
    }
}
