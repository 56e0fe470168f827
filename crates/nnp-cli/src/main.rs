mod cli;
mod commands;
mod config;
mod error;
mod logging;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\nError: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    info!("nnp CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    if let Some(num_threads) = cli.threads {
        info!(
            "Setting Rayon global thread pool to {} threads.",
            num_threads
        );
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(|e| {
                CliError::Other(anyhow::anyhow!("Failed to build global thread pool: {}", e))
            })?;
    }

    let command_result = match cli.command {
        Commands::Wrap(args) => {
            info!("Dispatching to 'wrap' command.");
            commands::wrap::run(args)
        }
        Commands::Repeats(args) => {
            info!("Dispatching to 'repeats' command.");
            commands::repeats::run(args)
        }
        Commands::Rotate(args) => {
            info!("Dispatching to 'rotate' command.");
            commands::rotate::run(args)
        }
        Commands::Vib(args) => {
            info!("Dispatching to 'vib' command.");
            commands::vib::run(args)
        }
    };

    match &command_result {
        Ok(_) => info!("Command completed successfully."),
        Err(e) => error!("Command failed: {}", e),
    }
    command_result
}
