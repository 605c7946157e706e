use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::cli::{Cli, Command};
use crate::config::{ProjectConfig, SyncMode};
use crate::orchestrator::{Orchestrator, RunRequest};
use crate::package_id;
use crate::paths::Layout;
use crate::state::WorkspaceRegistry;

/// Dispatches the parsed command line and returns the process exit code.
pub fn run(cli: Cli) -> Result<i32> {
    let layout = Layout::from_env()?;
    let orchestrator = Orchestrator::new(layout, std::env::vars_os());

    match cli.command {
        Command::Init { package, reset } => init_project(&orchestrator, package, reset),
        Command::Clear => clear_project(&orchestrator),
        Command::Workspaces => list_workspaces(&orchestrator),
        Command::Run(cmd) => run_in_workspace(&orchestrator, cmd, cli.sync_mode),
    }
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("failed to get current working directory")
}

fn init_project(orchestrator: &Orchestrator, package: Option<String>, reset: bool) -> Result<i32> {
    let project_dir = current_dir()?;

    let package = match package {
        Some(package) => package,
        None => {
            info!("no package name specified, scanning it automatically ...");
            let scanned = package_id::detect_package_name(&project_dir)
                .context("failed to auto-scan the package name")?;
            info!("scanned package name: {scanned}");
            scanned
        }
    };

    if reset {
        warn!("will reset the related workspace");
    }

    let root = orchestrator
        .init(&project_dir, &package, reset)
        .context("failed to initialize")?;

    println!("initialized `{package}` in workspace {}", root.display());
    Ok(0)
}

fn clear_project(orchestrator: &Orchestrator) -> Result<i32> {
    let project_dir = current_dir()?;

    let config = ProjectConfig::load(&project_dir)?;
    let package = config.package_name(&project_dir)?;

    let root = orchestrator
        .init(&project_dir, &package, true)
        .context("failed to reset the workspace")?;

    println!("workspace is clean: {}", root.display());
    Ok(0)
}

fn list_workspaces(orchestrator: &Orchestrator) -> Result<i32> {
    let registry = WorkspaceRegistry::load(&orchestrator.layout().registry)?;
    let current = std::env::current_dir().ok();

    let entries = registry
        .iter()
        .map(|(project, record)| (project.clone(), record.workspace_root_path.clone()))
        .collect();

    let lines = render_workspace_list(entries, current.as_deref());
    if lines.is_empty() {
        println!("no workspaces registered");
    }
    for line in lines {
        println!("{line}");
    }

    Ok(0)
}

fn run_in_workspace(
    orchestrator: &Orchestrator,
    cmd: Vec<String>,
    sync_mode: Option<SyncMode>,
) -> Result<i32> {
    let Some((program, args)) = cmd.split_first() else {
        bail!("no command specified");
    };

    let request = RunRequest {
        project_dir: current_dir()?,
        program: program.clone(),
        args: args.to_vec(),
        sync_mode,
    };

    let outcome = orchestrator.run(&request)?;
    debug!("command ran in workspace {}", outcome.workspace_root.display());
    if let Some(err) = &outcome.command_error {
        error!("{err}");
    }
    if let Some(err) = &outcome.sync_back_error {
        warn!("failed to sync the workspace back into the project: {err}");
    }

    Ok(outcome.exit_code)
}

fn render_workspace_list(
    mut entries: Vec<(PathBuf, PathBuf)>,
    current_project: Option<&Path>,
) -> Vec<String> {
    entries.sort();
    entries
        .into_iter()
        .map(|(project, workspace)| {
            let line = format!("{} -> {}", project.display(), workspace.display());
            if current_project.is_some_and(|current| current == project) {
                format!("* {line}")
            } else {
                format!("  {line}")
            }
        })
        .collect()
}
