mod custom_deserializer;

use custom_deserializer::{bool_true, deserialize_bool, deserialize_pathbuf};
use pipe_trait::Pipe;
use serde::Deserialize;
use std::{fs, path::PathBuf};

/// Configuration read from `.snpmrc` (INI syntax), merged with built-in
/// defaults. Resolution order when loaded via [`Config::current`]: CLI flag
/// (applied by the caller after loading) > project `.snpmrc` > home
/// `.snpmrc` > this struct's defaults.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Root of the content-addressed store. Defaults to `<home>/.snpm-store`.
    #[serde(default = "default_store_dir", deserialize_with = "deserialize_pathbuf")]
    pub store_dir: PathBuf,

    /// Base URL of the upstream package registry.
    #[serde(default = "default_registry")]
    pub registry: String,

    /// The directory dependencies are linked into, relative to the project
    /// root unless given as an absolute path.
    #[serde(default = "default_modules_dir", deserialize_with = "deserialize_pathbuf")]
    pub modules_dir: PathBuf,

    /// Equivalent of npm's `--legacy-peer-deps`: skip automatic peer
    /// dependency installation and strict peer checks.
    #[serde(default, deserialize_with = "deserialize_bool")]
    pub legacy_peer_deps: bool,

    /// When true, missing non-optional peer dependencies are queued for
    /// installation alongside the project's own declared deps.
    #[serde(default = "bool_true", deserialize_with = "deserialize_bool")]
    pub auto_install_peers: bool,
}

fn default_store_dir() -> PathBuf {
    home::home_dir().expect("home directory is not available").join(".snpm-store")
}

fn default_registry() -> String {
    "https://registry.npmjs.org/".to_string()
}

fn default_modules_dir() -> PathBuf {
    PathBuf::from("node_modules")
}

impl Config {
    pub fn new() -> Self {
        serde_ini::from_str("").expect("empty INI document always parses")
    }

    /// Load configuration, trying the project directory first, then the
    /// home directory, then falling back to `default`. Neither file is
    /// required to exist; a parse failure of an existing file also falls
    /// through rather than erroring, matching `.npmrc`'s permissive style.
    pub fn current<Error, ProjectDir, HomeDir, Default>(
        project_dir: ProjectDir,
        home_dir: HomeDir,
        default: Default,
    ) -> Self
    where
        ProjectDir: FnOnce() -> Result<PathBuf, Error>,
        HomeDir: FnOnce() -> Option<PathBuf>,
        Default: FnOnce() -> Config,
    {
        let load = |dir: PathBuf| -> Option<Config> {
            dir.join(".snpmrc")
                .pipe(fs::read_to_string)
                .ok()?
                .pipe_as_ref(serde_ini::from_str)
                .inspect_err(|error| tracing::warn!(%error, "failed to parse .snpmrc, ignoring"))
                .ok()
        };

        project_dir()
            .ok()
            .and_then(load)
            .or_else(|| home_dir().and_then(load))
            .unwrap_or_else(default)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
