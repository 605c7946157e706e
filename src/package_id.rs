use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::Command;
use tracing::debug;
use url::Url;

/// Turns a git clone URL into a Go package identifier, e.g.
/// `git@github.com:owner/repo.git` -> `github.com/owner/repo`.
pub fn parse_package_from_remote(remote_url: &str) -> Result<String> {
    let trimmed = remote_url.trim();
    let normalized = normalize_scp_style(trimmed);

    let url = Url::parse(&normalized)
        .with_context(|| format!("failed to parse remote URL ({trimmed})"))?;

    let host = url.host_str().filter(|host| !host.is_empty());
    let Some(host) = host else {
        bail!("no host found in URL ({trimmed})");
    };

    let path = url.path().trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    if path.is_empty() || path == "/" {
        bail!("no path found in URL ({trimmed})");
    }

    if path.starts_with('/') {
        Ok(format!("{host}{path}"))
    } else {
        Ok(format!("{host}/{path}"))
    }
}

/// `user@host:path` has no scheme; rewrite it as `ssh://user@host/path`.
fn normalize_scp_style(remote_url: &str) -> String {
    if remote_url.contains("://") {
        return remote_url.to_string();
    }

    match remote_url.split_once(':') {
        Some((authority, path)) if !authority.contains('/') && !authority.is_empty() => {
            format!("ssh://{authority}/{}", path.trim_start_matches('/'))
        }
        _ => remote_url.to_string(),
    }
}

/// Reads `origin` of the git repository at `project_dir` and derives the
/// package identifier from it.
pub fn detect_package_name(project_dir: &Path) -> Result<String> {
    let output = Command::new("git")
        .args(["remote", "get-url", "origin"])
        .current_dir(project_dir)
        .output()
        .context("failed to execute git")?;

    if !output.status.success() {
        bail!(
            "failed to get git remote url for origin: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let remote = String::from_utf8_lossy(&output.stdout).trim().to_string();
    debug!("found git remote: {remote}");

    let package = parse_package_from_remote(&remote)
        .with_context(|| format!("failed to parse package name from remote URL ({remote})"))?;
    if package.is_empty() {
        bail!("empty package name parsed from remote URL ({remote})");
    }

    Ok(package)
}
