use std::env;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const PROJECT_CONFIG_FILE: &str = "gows.yml";

fn resolve_home_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        if let Some(userprofile) = env::var_os("USERPROFILE").filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(userprofile));
        }

        if let (Some(mut homedrive), Some(homepath)) =
            (env::var_os("HOMEDRIVE"), env::var_os("HOMEPATH"))
            && !homedrive.is_empty()
            && !homepath.is_empty()
        {
            homedrive.push(homepath);
            return Some(PathBuf::from(homedrive));
        }

        env::var_os("HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    #[cfg(not(windows))]
    {
        env::var_os("HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }
}

pub fn gows_home() -> Result<PathBuf, ConfigError> {
    if let Some(home) = env::var_os("GOWS_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }

    let home = resolve_home_dir().ok_or(ConfigError::MissingHome)?;
    Ok(home.join(".config").join("gows"))
}

pub fn project_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(PROJECT_CONFIG_FILE)
}

/// Locations of the machine-wide gows files, resolved once per invocation.
#[derive(Debug, Clone)]
pub struct Layout {
    pub registry: PathBuf,
    pub user_config: PathBuf,
    pub workspaces: PathBuf,
}

impl Layout {
    pub fn at(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            registry: home.join("workspaces.yml"),
            user_config: home.join("config.yml"),
            workspaces: home.join("workspaces"),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::at(gows_home()?))
    }
}
