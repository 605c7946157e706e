use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{self, ProjectConfig, SyncMode, UserConfig};
use crate::env;
use crate::error::{CommandError, ConfigError, Result, SyncError, WorkspaceError};
use crate::paths::Layout;
use crate::process::{self, CommandSpec};
use crate::state::WorkspaceRegistry;
use crate::symlink::{self, ConflictPolicy};
use crate::sync;
use crate::workspace::WorkspaceResolver;

#[derive(Debug, Clone)]
pub struct RunRequest {
    pub project_dir: PathBuf,
    pub program: String,
    pub args: Vec<String>,
    /// Overrides `sync_mode` from the user config for this run.
    pub sync_mode: Option<SyncMode>,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub exit_code: i32,
    pub command_error: Option<CommandError>,
    /// Copy mode only. Reported, but never allowed to replace the command's
    /// own result.
    pub sync_back_error: Option<SyncError>,
    pub workspace_root: PathBuf,
}

/// Drives a single gows invocation: configs, workspace, sync, command.
pub struct Orchestrator {
    layout: Layout,
    base_env: BTreeMap<OsString, OsString>,
}

impl Orchestrator {
    pub fn new<I>(layout: Layout, base_env: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        Self {
            layout,
            base_env: base_env.into_iter().collect(),
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn init(
        &self,
        project_dir: &Path,
        package_name: &str,
        allow_reset: bool,
    ) -> Result<PathBuf> {
        let mut project = ProjectConfig {
            package_name: package_name.to_string(),
        };
        project.package_name = project.package_name(project_dir)?;
        let config_path = project.save(project_dir)?;
        debug!("project config saved to {}", config_path.display());

        let mut registry = WorkspaceRegistry::load(&self.layout.registry)?;
        let resolution = WorkspaceResolver::new(&self.layout.workspaces).resolve(
            &mut registry,
            project_dir,
            allow_reset,
        )?;
        if resolution.registry_changed {
            registry.save(&self.layout.registry)?;
        } else {
            warn!(
                "a workspace already exists for this project ({}), it will be reused; run `gows init --reset` for a fresh one",
                resolution.root.display()
            );
        }

        Ok(resolution.root)
    }

    pub fn run(&self, request: &RunRequest) -> Result<RunOutcome> {
        let project_dir = request.project_dir.as_path();

        let project = ProjectConfig::load(project_dir)?;
        let package_name = project.package_name(project_dir)?;
        let user = UserConfig::load(&self.layout.user_config)?;
        let mode = request.sync_mode.unwrap_or(user.sync_mode);
        let original_root = self.original_toolchain_root(&user.toolchain_root_env)?;
        debug!("sync mode: {}", mode.as_str());

        let mut registry = WorkspaceRegistry::load(&self.layout.registry)?;
        let resolution = WorkspaceResolver::new(&self.layout.workspaces).resolve(
            &mut registry,
            project_dir,
            false,
        )?;
        if resolution.registry_changed {
            info!("no workspace was registered for this project, created one");
            registry.save(&self.layout.registry)?;
        }
        let root = resolution.root;

        link_toolchain_bin(&original_root, &root, user.link_conflict)?;

        let package_dir = config::package_dir(&root, &package_name);
        match mode {
            SyncMode::Symlink => {
                let outcome =
                    symlink::ensure_symlink(project_dir, &package_dir, user.link_conflict)?;
                debug!("package link {}: {outcome:?}", package_dir.display());
            }
            SyncMode::Copy => {
                unlink_if_symlink(&package_dir)?;
                debug!(
                    "syncing {} -> {}",
                    project_dir.display(),
                    package_dir.display()
                );
                let stats = sync::mirror(project_dir, &package_dir)?;
                debug!(
                    "synced into workspace: {} copied, {} removed",
                    stats.copied, stats.removed
                );
            }
        }

        let spec = CommandSpec {
            program: request.program.clone(),
            args: request.args.clone(),
            env: env::build_environment(
                self.base_env.clone(),
                &user.toolchain_root_env,
                &root,
                &package_dir,
            ),
            work_dir: package_dir.clone(),
        };
        let (exit_code, command_error) = match process::run(&spec) {
            Ok(code) => (code, None),
            Err(err) => (err.exit_code(), Some(err)),
        };

        let sync_back_error = match mode {
            SyncMode::Symlink => None,
            SyncMode::Copy => {
                debug!(
                    "syncing back {} -> {}",
                    package_dir.display(),
                    project_dir.display()
                );
                match sync::mirror(&package_dir, project_dir) {
                    Ok(stats) => {
                        debug!(
                            "synced back: {} copied, {} removed",
                            stats.copied, stats.removed
                        );
                        None
                    }
                    Err(err) => Some(err),
                }
            }
        };

        Ok(RunOutcome {
            exit_code,
            command_error,
            sync_back_error,
            workspace_root: root,
        })
    }

    fn original_toolchain_root(&self, name: &str) -> Result<PathBuf> {
        self.base_env
            .get(OsStr::new(name))
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| {
                ConfigError::MissingToolchainRoot {
                    name: name.to_string(),
                }
                .into()
            })
    }
}

fn link_toolchain_bin(
    original_root: &Path,
    workspace_root: &Path,
    policy: ConflictPolicy,
) -> Result<()> {
    let original_bin = original_root.join("bin");
    let original_bin = std::path::absolute(&original_bin).map_err(|source| {
        WorkspaceError::Inspect {
            path: original_bin.clone(),
            source,
        }
    })?;

    let outcome = symlink::ensure_symlink(&original_bin, &workspace_root.join("bin"), policy)?;
    debug!("bin link: {outcome:?}");
    Ok(())
}

// A link left by symlink mode points at the project itself.
fn unlink_if_symlink(path: &Path) -> Result<()> {
    let is_link = fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_symlink());
    if !is_link {
        return Ok(());
    }

    debug!("removing link {} before copying", path.display());
    symlink::remove_link(path).map_err(|source| {
        WorkspaceError::Remove {
            path: path.to_path_buf(),
            source,
        }
        .into()
    })
}
