use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::error::ConfigError;
use crate::paths;
use crate::symlink::ConflictPolicy;

pub const DEFAULT_TOOLCHAIN_ROOT_ENV: &str = "GOPATH";

/// How the project content reaches `<workspace>/src/<package>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    #[default]
    Symlink,
    Copy,
}

impl SyncMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Symlink => "symlink",
            Self::Copy => "copy",
        }
    }
}

/// Stored next to the project sources in `gows.yml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub package_name: String,
}

impl ProjectConfig {
    pub fn load(project_dir: &Path) -> Result<Self, ConfigError> {
        let path = paths::project_config_path(project_dir);
        if !path.exists() {
            return Err(ConfigError::MissingProject { path });
        }

        read_yaml(&path)
    }

    pub fn save(&self, project_dir: &Path) -> Result<PathBuf, ConfigError> {
        let path = paths::project_config_path(project_dir);
        write_yaml(&path, self)?;
        Ok(path)
    }

    /// The recorded package identifier in its cleaned `a/b/c` form.
    pub fn package_name(&self, project_dir: &Path) -> Result<String, ConfigError> {
        let name = self.package_name.trim();
        if name.is_empty() {
            return Err(ConfigError::EmptyPackageName {
                path: paths::project_config_path(project_dir),
            });
        }

        clean_package_name(name).ok_or_else(|| ConfigError::InvalidPackageName {
            name: name.to_string(),
            path: paths::project_config_path(project_dir),
        })
    }
}

/// Where the package lives inside a workspace: `<root>/src/<segments...>`.
pub fn package_dir(workspace_root: &Path, package_name: &str) -> PathBuf {
    package_name
        .split('/')
        .fold(workspace_root.join("src"), |dir, segment| dir.join(segment))
}

// Every segment must be a single plain path component, so the joined
// package dir never leaves `<root>/src`.
fn clean_package_name(name: &str) -> Option<String> {
    if name.starts_with('/') {
        return None;
    }

    let segments: Vec<&str> = name.split('/').filter(|s| !s.is_empty()).collect();
    let plain = segments.iter().all(|segment| {
        let mut components = Path::new(segment).components();
        matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        )
    });

    (plain && !segments.is_empty()).then(|| segments.join("/"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub sync_mode: SyncMode,
    pub toolchain_root_env: String,
    /// What to do when a real file or directory occupies a link location.
    pub link_conflict: ConflictPolicy,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            sync_mode: SyncMode::default(),
            toolchain_root_env: DEFAULT_TOOLCHAIN_ROOT_ENV.to_string(),
            link_conflict: ConflictPolicy::default(),
        }
    }
}

impl UserConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("no user config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let mut config: Self = read_yaml(path)?;
        if config.toolchain_root_env.trim().is_empty() {
            config.toolchain_root_env = DEFAULT_TOOLCHAIN_ROOT_ENV.to_string();
        }
        Ok(config)
    }
}

pub(crate) fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Serializes `value` into a sibling temp file and renames it over `path`,
/// so a reader sees either the old or the new content.
pub(crate) fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    let raw = serde_yaml::to_string(value).map_err(|source| ConfigError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;

    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(format!(".{}.tmp", std::process::id()));
    let tmp = path.with_file_name(tmp_name);

    fs::write(&tmp, raw).map_err(write_err)?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(err));
    }

    Ok(())
}
