use derive_more::{Display, Error, From};
use miette::Diagnostic;
use std::{
    path::Path,
    process::{Command, Output},
};

#[derive(Debug, Display, Error, Diagnostic, From)]
#[non_exhaustive]
pub enum ExecutorError {
    #[diagnostic(code(snpm_executor::io_error))]
    Io(#[error(source)] std::io::Error),

    #[display("bootstrap installer {command:?} failed with {}\nstdout:\n{stdout}\nstderr:\n{stderr}", exit_status_display(exit_code))]
    #[diagnostic(code(snpm_executor::bootstrap_failure))]
    BootstrapFailure {
        command: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

fn exit_status_display(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

pub fn execute_shell(command: &str) -> Result<(), ExecutorError> {
    let mut cmd = Command::new("sh").arg("-c").arg(command).spawn()?;

    cmd.wait()?;

    Ok(())
}

/// Invoke the external bootstrap package-manager binary against a scratch
/// directory that already contains a minimal manifest listing only the
/// unresolved `(name, range)` pairs.
///
/// `legacy_peer_deps` appends an equivalent flag when the caller requested
/// legacy peer dependency resolution. Captures stdout/stderr so a non-zero
/// exit can be reported with full context.
pub fn run_bootstrap_install(
    binary: &str,
    scratch_dir: &Path,
    legacy_peer_deps: bool,
) -> Result<Output, ExecutorError> {
    let mut command = Command::new(binary);
    command.arg("install").current_dir(scratch_dir);
    if legacy_peer_deps {
        command.arg("--legacy-peer-deps");
    }

    tracing::debug!(binary, scratch_dir = %scratch_dir.display(), "running bootstrap installer");
    let output = command.output()?;

    if !output.status.success() {
        return Err(ExecutorError::BootstrapFailure {
            command: format!("{binary} install"),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(output)
}

/// Move `from` to `to` via the `mv` subprocess, tolerating a concurrent
/// winner of the same move.
///
/// Exit code 0 is success. A non-zero exit whose stderr contains the
/// substring `Directory not empty` is treated as success too: another
/// absorb of the same store entry got there first. Any other failure is
/// reported as an [`ExecutorError::Io`].
pub fn mv(from: &Path, to: &Path) -> Result<(), ExecutorError> {
    let output = Command::new("mv").arg(from).arg(to).output()?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.contains("Directory not empty") {
        tracing::warn!(from = %from.display(), to = %to.display(), "mv target already populated, ignoring");
        return Ok(());
    }

    Err(std::io::Error::other(stderr.into_owned()).into())
}
