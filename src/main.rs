//! Runsheet CLI
//!
//! A command-line tool for running scripted jobs against named SQLite
//! databases.

use clap::Parser;
use runsheet::cli::{
    args::{Cli, Commands},
    commands::{jobs, run, validate},
};

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run the appropriate command
    match cli.command {
        Commands::Run {
            script,
            run_only,
            run_from,
            live,
            report,
        } => {
            let options = run::RunOptions {
                run_only,
                run_from,
                live,
                verbose: cli.verbose,
                report,
            };
            run::run_script(&script, &options)?;
        }

        Commands::Validate { script } => {
            validate::validate(&script)?;
        }

        Commands::Jobs => {
            jobs::list_jobs()?;
        }
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("runsheet=debug")
    } else {
        EnvFilter::new("runsheet=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
