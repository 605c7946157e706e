use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::Path;

pub const WORKDIR_ENV: &str = "PWD";

/// The child environment: everything in `base`, with the toolchain root
/// pointed at the workspace and `PWD` matching the real working directory.
pub fn build_environment<I>(
    base: I,
    toolchain_root_env: &str,
    workspace_root: &Path,
    work_dir: &Path,
) -> BTreeMap<OsString, OsString>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut env_map: BTreeMap<OsString, OsString> = base.into_iter().collect();

    // Names are case-insensitive on Windows; drop every spelling first.
    env_map.retain(|key, _| {
        !same_var(key, OsStr::new(toolchain_root_env)) && !same_var(key, OsStr::new(WORKDIR_ENV))
    });

    env_map.insert(toolchain_root_env.into(), workspace_root.as_os_str().to_owned());
    env_map.insert(WORKDIR_ENV.into(), work_dir.as_os_str().to_owned());

    env_map
}

#[cfg(windows)]
fn same_var(a: &OsStr, b: &OsStr) -> bool {
    a.eq_ignore_ascii_case(b)
}

#[cfg(not(windows))]
fn same_var(a: &OsStr, b: &OsStr) -> bool {
    a == b
}
