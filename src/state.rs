use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::{read_yaml, write_yaml};
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceRecord {
    pub workspace_root_path: PathBuf,
}

/// Machine-wide map of project path -> workspace, keyed by the project's
/// absolute path rather than its package name.
///
/// There is no locking: two gows processes that read-modify-write the file
/// at the same time can lose one of the updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceRegistry {
    #[serde(default)]
    pub workspaces: BTreeMap<PathBuf, WorkspaceRecord>,
}

impl WorkspaceRegistry {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        read_yaml(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        write_yaml(path, self)
    }

    pub fn get(&self, project_path: &Path) -> Option<&WorkspaceRecord> {
        self.workspaces.get(project_path)
    }

    pub fn insert(&mut self, project_path: PathBuf, workspace_root_path: PathBuf) {
        self.workspaces.insert(
            project_path,
            WorkspaceRecord {
                workspace_root_path,
            },
        );
    }

    pub fn remove(&mut self, project_path: &Path) -> Option<WorkspaceRecord> {
        self.workspaces.remove(project_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &WorkspaceRecord)> {
        self.workspaces.iter()
    }
}
