use std::path::PathBuf;

use thiserror::Error;

/// Exit code reserved for "the environment could not be prepared", so callers
/// can tell it apart from the wrapped command failing on its own.
pub const ORCHESTRATION_FAILURE: i32 = 125;

const COMMAND_NOT_FOUND: i32 = 127;
const COMMAND_NOT_EXECUTABLE: i32 = 126;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures that abort a run before (or instead of) the user command.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
    #[error(transparent)]
    Sync(#[from] SyncError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("project config not found at {path} (run `gows init` first)")]
    MissingProject { path: PathBuf },
    #[error("no package name recorded in {path} (run `gows init <package>`)")]
    EmptyPackageName { path: PathBuf },
    #[error(
        "invalid package name `{name}` in {path}: expected a relative path like example.com/owner/repo without `.` or `..` segments"
    )]
    InvalidPackageName { name: String, path: PathBuf },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("environment variable `{name}` is not set; {name}/bin is linked into every workspace")]
    MissingToolchainRoot { name: String },
    #[error("failed to resolve home directory from environment variables")]
    MissingHome,
}

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("workspace registered for {project} has an empty root path")]
    EmptyRoot { project: PathBuf },
    #[error("failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to remove previous workspace at {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to inspect {path}: {source}")]
    Inspect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unexpected non-symlink at {path}; refusing to replace it")]
    Conflict { path: PathBuf },
    #[error("failed to link {location} -> {target}: {source}")]
    Link {
        target: PathBuf,
        location: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("sync source {path} is not a directory")]
    SourceNotDir { path: PathBuf },
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("failed to sync {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to execute `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to determine exit status of `{program}`")]
    UnknownStatus { program: String },
}

impl CommandError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Launch { source, .. } => match source.kind() {
                std::io::ErrorKind::NotFound => COMMAND_NOT_FOUND,
                std::io::ErrorKind::PermissionDenied => COMMAND_NOT_EXECUTABLE,
                _ => ORCHESTRATION_FAILURE,
            },
            Self::UnknownStatus { .. } => ORCHESTRATION_FAILURE,
        }
    }
}
