use anyhow::{Context, Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_ENV: &str = "GOWS_LOG";

/// Installs the stderr logger. `level` (from `--loglevel`) wins over
/// `GOWS_LOG`, which wins over `info`.
pub fn init_logging(level: Option<&str>) -> Result<()> {
    let directives = resolve_directives(level, std::env::var(LOG_ENV).ok());

    let filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("invalid log level `{directives}`"))?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .map_err(|err| anyhow!("failed to initialize logging: {err}"))
}

fn resolve_directives(flag: Option<&str>, env_value: Option<String>) -> String {
    flag.map(str::to_string)
        .into_iter()
        .chain(env_value)
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| "info".to_string())
}
