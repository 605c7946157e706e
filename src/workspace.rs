use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::WorkspaceError;
use crate::state::WorkspaceRegistry;

/// Directories a fresh workspace gets. `bin` is not among them: it becomes a
/// link to the user's own `$GOPATH/bin` before every run.
pub const WORKSPACE_LAYOUT: &[&str] = &["src", "pkg"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub root: PathBuf,
    /// True when the registry gained or replaced an entry and must be saved.
    pub registry_changed: bool,
}

#[derive(Debug, Clone)]
pub struct WorkspaceResolver {
    workspaces_dir: PathBuf,
}

impl WorkspaceResolver {
    pub fn new(workspaces_dir: impl Into<PathBuf>) -> Self {
        Self {
            workspaces_dir: workspaces_dir.into(),
        }
    }

    /// The registry is only updated in memory, and only after the directory
    /// tree exists; the caller persists it.
    pub fn resolve(
        &self,
        registry: &mut WorkspaceRegistry,
        project_path: &Path,
        allow_reset: bool,
    ) -> Result<Resolution, WorkspaceError> {
        let mut previous = None;

        if let Some(record) = registry.get(project_path) {
            let root = record.workspace_root_path.clone();
            if root.as_os_str().is_empty() {
                return Err(WorkspaceError::EmptyRoot {
                    project: project_path.to_path_buf(),
                });
            }

            if !allow_reset {
                debug!("reusing workspace {} for {}", root.display(), project_path.display());
                ensure_layout(&root)?;
                return Ok(Resolution {
                    root,
                    registry_changed: false,
                });
            }

            warn!("resetting workspace {}", root.display());
            if root.exists() {
                fs::remove_dir_all(&root).map_err(|source| WorkspaceError::Remove {
                    path: root.clone(),
                    source,
                })?;
            }
            registry.remove(project_path);
            previous = Some(root);
        }

        let root = self.new_workspace_path(project_path, previous.as_deref());
        ensure_layout(&root)?;
        info!("created workspace {} for {}", root.display(), project_path.display());

        registry.insert(project_path.to_path_buf(), root.clone());
        Ok(Resolution {
            root,
            registry_changed: true,
        })
    }

    fn new_workspace_path(&self, project_path: &Path, previous: Option<&Path>) -> PathBuf {
        let base = project_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "project".to_string());
        let stem = format!("{base}-{}", Utc::now().timestamp());

        let mut candidate = self.workspaces_dir.join(&stem);
        let mut counter = 1usize;
        while candidate.exists() || previous.is_some_and(|prev| prev == candidate) {
            counter += 1;
            candidate = self.workspaces_dir.join(format!("{stem}-{counter}"));
        }
        candidate
    }
}

fn ensure_layout(root: &Path) -> Result<(), WorkspaceError> {
    for dir in WORKSPACE_LAYOUT {
        let path = root.join(dir);
        fs::create_dir_all(&path).map_err(|source| WorkspaceError::Create { path, source })?;
    }
    Ok(())
}
