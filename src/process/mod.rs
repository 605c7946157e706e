use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use tracing::debug;

use crate::error::CommandError;

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
use self::unix as platform;
#[cfg(windows)]
use self::windows as platform;

/// A fully prepared invocation: what to run, where, and with exactly which
/// environment. Nothing is inherited from the parent except stdio.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub work_dir: PathBuf,
    pub env: BTreeMap<OsString, OsString>,
}

/// Runs `spec` with stdin/stdout/stderr passed straight through and blocks
/// until it exits.
///
/// A non-zero exit is returned as `Ok(code)`; only failing to start the
/// program or to decode how it ended is an error.
pub fn run(spec: &CommandSpec) -> Result<i32, CommandError> {
    debug!("running {} {:?} in {}", spec.program, spec.args, spec.work_dir.display());

    let status = Command::new(&spec.program)
        .args(&spec.args)
        .current_dir(&spec.work_dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .env_clear()
        .envs(spec.env.iter())
        .status()
        .map_err(|source| CommandError::Launch {
            program: spec.program.clone(),
            source,
        })?;

    let code = exit_code(&status).ok_or_else(|| CommandError::UnknownStatus {
        program: spec.program.clone(),
    })?;
    debug!("{} exited with {code}", spec.program);

    Ok(code)
}

fn exit_code(status: &ExitStatus) -> Option<i32> {
    status.code().or_else(|| platform::signal_exit_code(status))
}
