//! Command line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Runsheet - run scripted jobs against named databases
#[derive(Parser, Debug)]
#[command(name = "runsheet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a script
    Run {
        /// Path to the script file
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Run only the named group
        #[arg(long, value_name = "GROUP", conflicts_with = "run_from")]
        run_only: Option<String>,

        /// Run from the named group to the end of the script
        #[arg(long, value_name = "GROUP")]
        run_from: Option<String>,

        /// Run jobs for real; without this every job is a no-op
        #[arg(long)]
        live: bool,

        /// Write the run report as JSON to this path
        #[arg(short, long, value_name = "REPORT")]
        report: Option<PathBuf>,
    },

    /// Check a script without running it
    Validate {
        /// Path to the script file
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
    },

    /// List the registered job kinds
    Jobs,
}
