use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;
use crate::config::SyncMode;
use crate::telemetry;

#[derive(Debug, Parser)]
#[command(
    name = "gows",
    version = env!("VERSION"),
    about = "Go workspace manager: build any project in its own isolated GOPATH",
    long_about = "Every project gets its own isolated Go workspace, no matter where it is \
located. gows links (or copies) the project into that workspace, points GOPATH at it \
and runs your command there.\n\nExample: gows go build ./...",
    long_version = concat!(
        "version ",
        env!("VERSION"),
        "\n",
        "  commit: ",
        env!("COMMIT"),
        "\n",
        "  built at: ",
        env!("DATE"),
        "\n",
        "  rust version: ",
        env!("RUSTC_VERSION"),
        "\n",
        "  platform: ",
        env!("OS"),
        "/",
        env!("ARCH")
    )
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level or filter directives (debug, info, warn, error).
    #[arg(short = 'l', long = "loglevel", global = true, value_name = "level")]
    pub loglevel: Option<String>,

    /// Override the configured sync mode for this run.
    #[arg(long = "sync-mode", global = true, value_enum, value_name = "mode")]
    pub sync_mode: Option<SyncMode>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Initialize gows for the project in the current directory.
    Init {
        /// Package identifier, e.g. github.com/owner/repo. Detected from the
        /// git `origin` remote when omitted.
        #[arg(value_name = "package")]
        package: Option<String>,

        /// Delete the previous workspace (if any) and create a new one.
        #[arg(long, default_value_t = false)]
        reset: bool,
    },
    /// Replace this project's workspace with a fresh, empty one.
    Clear,
    /// List registered project -> workspace paths.
    Workspaces,
    /// Any other command is run inside the project's workspace.
    #[command(external_subcommand)]
    Run(Vec<String>),
}

pub fn run() -> Result<i32> {
    let cli = Cli::parse();

    telemetry::init_logging(cli.loglevel.as_deref())?;

    commands::run(cli)
}
