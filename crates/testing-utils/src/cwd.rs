use assert_cmd::cargo::CommandCargoExt;
use std::{fs, path::PathBuf, process::Command};
use tempfile::{tempdir, TempDir};

/// Assets for an integration test that spawns the `snpm` binary as a
/// sub-process in a temporary directory.
pub struct CommandTempCwd<SnpmrcInfo> {
    /// Command of `snpm`, with [`Self::workspace`] as its working directory.
    pub snpm: Command,
    /// Temporary directory containing [`Self::workspace`] and (once added) the
    /// store directory.
    pub root: TempDir,
    /// The project directory `snpm` is run from.
    pub workspace: PathBuf,
    /// Optional info about the `.snpmrc` file, if one was added.
    pub snpmrc_info: SnpmrcInfo,
}

impl CommandTempCwd<()> {
    /// Create a temporary directory, a `workspace` sub-directory, and a
    /// `snpm` command with its current directory set to `workspace`.
    pub fn init() -> Self {
        let root = tempdir().expect("create temporary directory");
        let workspace = root.path().join("workspace");
        fs::create_dir(&workspace).expect("create temporary workspace for the command");
        let mut snpm = Command::cargo_bin("snpm").expect("find the snpm binary");
        snpm.current_dir(&workspace);
        CommandTempCwd { snpm, root, workspace, snpmrc_info: () }
    }
}

/// Info about a `.snpmrc` pointing at an isolated store directory, so a test
/// run never touches the real user's `~/.snpm-store`.
pub struct AddDefaultSnpmrc {
    pub snpmrc_path: PathBuf,
    pub store_dir: PathBuf,
}

impl CommandTempCwd<()> {
    /// Write a `.snpmrc` defining `store-dir` as a sibling of `workspace`.
    pub fn add_default_snpmrc(self) -> CommandTempCwd<AddDefaultSnpmrc> {
        let store_dir = self.root.path().join("snpm-store");
        let snpmrc_path = self.workspace.join(".snpmrc");
        fs::write(&snpmrc_path, "store-dir=../snpm-store\n").expect("write .snpmrc");
        let snpmrc_info = AddDefaultSnpmrc { snpmrc_path, store_dir };
        let CommandTempCwd { snpm, root, workspace, snpmrc_info: () } = self;
        CommandTempCwd { snpm, root, workspace, snpmrc_info }
    }
}

/// Info about a `.snpmrc` additionally pointing `registry` at a mocked
/// server, for CLI integration tests that exercise the bootstrap path.
pub struct AddMockedRegistrySnpmrc {
    pub snpmrc_path: PathBuf,
    pub store_dir: PathBuf,
}

impl CommandTempCwd<()> {
    pub fn add_mocked_registry_snpmrc(self, registry_url: &str) -> CommandTempCwd<AddMockedRegistrySnpmrc> {
        let store_dir = self.root.path().join("snpm-store");
        let snpmrc_path = self.workspace.join(".snpmrc");
        fs::write(&snpmrc_path, format!("store-dir=../snpm-store\nregistry={registry_url}\n"))
            .expect("write .snpmrc");
        let snpmrc_info = AddMockedRegistrySnpmrc { snpmrc_path, store_dir };
        let CommandTempCwd { snpm, root, workspace, snpmrc_info: () } = self;
        CommandTempCwd { snpm, root, workspace, snpmrc_info }
    }
}
