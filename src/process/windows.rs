use std::process::ExitStatus;

// Windows always reports an exit code, so there is nothing else to decode.
pub fn signal_exit_code(_status: &ExitStatus) -> Option<i32> {
    None
}
