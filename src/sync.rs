//! One-way directory mirroring used by the copy sync mode.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::SyncError;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MirrorStats {
    pub copied: usize,
    pub removed: usize,
}

/// Makes `dest` an exact copy of `source`: new and changed entries are
/// copied over, entries that only exist in `dest` are deleted.
///
/// Files whose size and modification time already match are skipped.
/// Symlinks are recreated as links, never followed.
pub fn mirror(source: &Path, dest: &Path) -> Result<MirrorStats, SyncError> {
    if !source.is_dir() {
        return Err(SyncError::SourceNotDir {
            path: source.to_path_buf(),
        });
    }

    fs::create_dir_all(dest).map_err(io_err(dest))?;

    let mut stats = MirrorStats::default();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source_err| SyncError::Walk {
            path: source.to_path_buf(),
            source: source_err,
        })?;
        let relative = relative_to(entry.path(), source);
        let target = dest.join(&relative);
        seen.insert(relative);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            clear_if(&target, |meta| !meta.is_dir())?;
            fs::create_dir_all(&target).map_err(io_err(&target))?;
        } else if file_type.is_symlink() {
            let link = fs::read_link(entry.path()).map_err(io_err(entry.path()))?;
            if fs::read_link(&target).is_ok_and(|existing| existing == link) {
                continue;
            }
            clear_if(&target, |_| true)?;
            copy_symlink(&link, &target).map_err(io_err(&target))?;
            stats.copied += 1;
        } else {
            if is_up_to_date(entry.path(), &target) {
                continue;
            }
            clear_if(&target, |_| true)?;
            copy_file(entry.path(), &target).map_err(io_err(&target))?;
            stats.copied += 1;
        }
    }

    // Children come before their parent, so whole stale trees go bottom-up.
    for entry in WalkDir::new(dest).min_depth(1).contents_first(true) {
        let entry = entry.map_err(|source_err| SyncError::Walk {
            path: dest.to_path_buf(),
            source: source_err,
        })?;
        if seen.contains(&relative_to(entry.path(), dest)) {
            continue;
        }

        let removed = if entry.file_type().is_dir() {
            fs::remove_dir(entry.path())
        } else {
            fs::remove_file(entry.path())
        };
        removed.map_err(io_err(entry.path()))?;
        stats.removed += 1;
    }

    debug!(
        "mirrored {} -> {} ({} copied, {} removed)",
        source.display(),
        dest.display(),
        stats.copied,
        stats.removed
    );

    Ok(stats)
}

fn io_err(path: &Path) -> impl Fn(io::Error) -> SyncError + '_ {
    move |source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn relative_to(path: &Path, base: &Path) -> PathBuf {
    path.strip_prefix(base).unwrap_or(path).to_path_buf()
}

/// Removes whatever is at `path` when `predicate` says it is in the way.
fn clear_if(path: &Path, predicate: impl Fn(&fs::Metadata) -> bool) -> Result<(), SyncError> {
    let Ok(meta) = fs::symlink_metadata(path) else {
        return Ok(());
    };
    if !predicate(&meta) {
        return Ok(());
    }

    let removed = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    removed.map_err(io_err(path))
}

fn is_up_to_date(source: &Path, target: &Path) -> bool {
    let (Ok(src), Ok(dst)) = (fs::metadata(source), fs::symlink_metadata(target)) else {
        return false;
    };
    if !dst.is_file() || src.len() != dst.len() {
        return false;
    }
    match (src.modified(), dst.modified()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn copy_file(source: &Path, target: &Path) -> io::Result<()> {
    fs::copy(source, target)?;
    // Matching mtimes let the next mirror skip this file.
    if let Ok(modified) = fs::metadata(source).and_then(|meta| meta.modified()) {
        if let Err(err) = File::open(target).and_then(|file| file.set_modified(modified)) {
            debug!("failed to carry mtime over to {}: {err}", target.display());
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(link, target)
}

#[cfg(windows)]
fn copy_symlink(link: &Path, target: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(link, target)
}
