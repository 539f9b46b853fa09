pub mod install;
pub mod uninstall;

use clap::{Parser, Subcommand};
use install::InstallArgs;
use snpm_config::Config;
use snpm_registry::RegistryClient;
use std::path::PathBuf;
use uninstall::UninstallArgs;

/// A fast package installer that links dependencies from a shared,
/// content-addressed store.
#[derive(Debug, Parser)]
#[clap(name = "snpm")]
#[clap(bin_name = "snpm")]
#[clap(version)]
#[clap(about = "A fast package installer that links dependencies from a shared store")]
pub struct CliArgs {
    #[clap(subcommand)]
    pub command: Option<CliCommand>,

    /// Run as if snpm was started in this directory.
    #[clap(short = 'C', long, default_value = ".")]
    pub dir: PathBuf,

    /// Override the store directory configured by `.snpmrc`.
    #[clap(long)]
    pub store_dir: Option<PathBuf>,

    /// Apply the command to every project under `dir`, not just `dir` itself.
    #[clap(short, long)]
    pub recursive: bool,

    /// Skip automatic peer dependency installation and strict peer checks.
    #[clap(long)]
    pub legacy_peer_deps: bool,

    /// Emit verbose logging. Has no effect when the `TRACE` environment
    /// variable is already set.
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational logging.
    #[clap(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Install dependencies, optionally adding new ones first.
    #[clap(visible_aliases = ["i", "add", "a"])]
    Install(InstallArgs),
    /// Remove one or more dependencies.
    #[clap(visible_aliases = ["u", "remove", "r"])]
    Uninstall(UninstallArgs),
}

impl CliArgs {
    /// Execute the command.
    pub async fn run(self) -> miette::Result<()> {
        let CliArgs { command, dir, store_dir, recursive, legacy_peer_deps, verbose, quiet } = self;
        let _ = (verbose, quiet); // logging verbosity is controlled by the TRACE env var; these flags exist for a familiar surface

        let project_dir = dir;

        let mut config = Config::current(
            || Ok::<_, std::io::Error>(project_dir.clone()),
            home::home_dir,
            Config::default,
        );
        if let Some(store_dir) = store_dir {
            config.store_dir = store_dir;
        }
        if legacy_peer_deps {
            config.legacy_peer_deps = true;
        }

        let registry = RegistryClient::new(config.registry.clone());

        match command {
            Some(CliCommand::Install(args)) => args.run(&project_dir, &config, &registry, recursive).await,
            Some(CliCommand::Uninstall(args)) => args.run(&project_dir, recursive).await,
            None => InstallArgs::default().run(&project_dir, &config, &registry, recursive).await,
        }
    }
}
