use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

/// Shell convention for a child killed by a signal: 128 + signal number.
pub fn signal_exit_code(status: &ExitStatus) -> Option<i32> {
    status.signal().map(|signal| 128 + signal)
}
