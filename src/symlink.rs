use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::WorkspaceError;

/// What to do when a real file or directory sits where a link should go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    #[default]
    Fail,
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Created,
    Unchanged,
    Replaced,
}

/// Makes `location` a symlink to `target`.
///
/// The filesystem is the only source of truth: the location is inspected on
/// every call, a correct link is left alone, and a link pointing elsewhere is
/// swapped for a fresh one.
pub fn ensure_symlink(
    target: &Path,
    location: &Path,
    policy: ConflictPolicy,
) -> Result<LinkOutcome, WorkspaceError> {
    let inspect_err = |source| WorkspaceError::Inspect {
        path: location.to_path_buf(),
        source,
    };

    let metadata = match fs::symlink_metadata(location) {
        Ok(metadata) => Some(metadata),
        Err(err) if err.kind() == io::ErrorKind::NotFound => None,
        Err(err) => return Err(inspect_err(err)),
    };

    let Some(metadata) = metadata else {
        create_link(target, location)?;
        return Ok(LinkOutcome::Created);
    };

    if !metadata.file_type().is_symlink() {
        if policy == ConflictPolicy::Fail {
            return Err(WorkspaceError::Conflict {
                path: location.to_path_buf(),
            });
        }

        warn!("replacing non-symlink at {}", location.display());
        let removed = if metadata.is_dir() {
            fs::remove_dir_all(location)
        } else {
            fs::remove_file(location)
        };
        removed.map_err(|source| WorkspaceError::Remove {
            path: location.to_path_buf(),
            source,
        })?;
        create_link(target, location)?;
        return Ok(LinkOutcome::Replaced);
    }

    let current = fs::read_link(location).map_err(inspect_err)?;
    if current == target {
        debug!("symlink {} already points at {}", location.display(), target.display());
        return Ok(LinkOutcome::Unchanged);
    }

    warn!(
        "symlink {} points at {} instead of {}, re-creating it",
        location.display(),
        current.display(),
        target.display()
    );
    remove_link(location).map_err(|source| WorkspaceError::Remove {
        path: location.to_path_buf(),
        source,
    })?;
    create_link(target, location)?;

    Ok(LinkOutcome::Replaced)
}

fn create_link(target: &Path, location: &Path) -> Result<(), WorkspaceError> {
    if let Some(parent) = location.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| WorkspaceError::Create {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    debug!("linking {} -> {}", location.display(), target.display());
    platform_symlink(target, location).map_err(|source| WorkspaceError::Link {
        target: target.to_path_buf(),
        location: location.to_path_buf(),
        source,
    })
}

#[cfg(unix)]
fn platform_symlink(target: &Path, location: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, location)
}

#[cfg(windows)]
fn platform_symlink(target: &Path, location: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, location)
}

#[cfg(unix)]
pub(crate) fn remove_link(location: &Path) -> io::Result<()> {
    fs::remove_file(location)
}

// Directory symlinks on Windows are removed like directories.
#[cfg(windows)]
pub(crate) fn remove_link(location: &Path) -> io::Result<()> {
    fs::remove_dir(location).or_else(|_| fs::remove_file(location))
}
