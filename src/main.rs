mod cli;
mod commands;
mod config;
mod env;
mod error;
mod orchestrator;
mod package_id;
mod paths;
mod process;
mod state;
mod symlink;
mod sync;
mod telemetry;
mod workspace;

fn main() {
    match cli::run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(error::ORCHESTRATION_FAILURE);
        }
    }
}
