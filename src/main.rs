//! rxdesk - session-gated resource loading for the pharmacy and clinic backend
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;

use clap::Parser;
use rxdesk::Command;

/// rxdesk - browse hospitals, orders and prescriptions from the terminal
#[derive(Parser, Debug)]
#[command(name = "rxdesk")]
#[command(about = "Session-gated resource loading with NDJSON output", long_about = None)]
struct Args {
    /// Directory holding .rxdesk/ (defaults to the current directory)
    #[arg(long, value_name = "PATH")]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    // Logs go to a file; stdout carries NDJSON events only
    rxdesk_core::logging::init()?;

    let project_path = args
        .dir
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    tracing::info!("Project path: {}", project_path.display());

    let outcome = rxdesk::run(&project_path, args.command).await?;
    tracing::info!("rxdesk exiting ({:?})", outcome);

    std::process::exit(outcome.exit_code());
}
