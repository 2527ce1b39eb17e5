//! Run command implementation.
//!
//! Loads a script, runs it, prints a per-group summary and optionally
//! writes the run report as JSON.

use crate::core::runner::{RunConfig, Runner};
use crate::models::config;
use crate::models::report::{save_report, RunReport};
use crate::models::script::load_script;
use crate::{Error, Result};
use colored::Colorize;
use std::path::Path;

/// Options for the run command.
#[derive(Debug, Default)]
pub struct RunOptions {
    pub run_only: Option<String>,
    pub run_from: Option<String>,
    pub live: bool,
    pub verbose: bool,
    pub report: Option<std::path::PathBuf>,
}

/// Run a script file.
pub fn run_script(script_path: &Path, options: &RunOptions) -> Result<()> {
    println!("{}", "[RUN] Running script...".bold().cyan());
    println!();

    let mut script = load_script(script_path)?;
    script.merge_default_databases(config::load_config().databases);

    let script_dir = script_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    let run_config = match (&options.run_only, &options.run_from) {
        (Some(group), _) => RunConfig::Single(group.clone()),
        (None, Some(group)) => RunConfig::From(group.clone()),
        (None, None) => RunConfig::All,
    };

    if options.live {
        println!("{}", "[WARNING] Live mode - jobs will run for real!".bold().yellow());
    } else {
        println!("[INFO] Test mode - add --live to run jobs for real");
    }
    println!();

    let runner = Runner::new()
        .run_config(run_config)
        .live(options.live)
        .verbose(options.verbose);

    let report = runner.run(&script, &script_dir)?;

    print_summary(&report);

    if let Some(ref path) = options.report {
        save_report(&report, path)?;
        println!(
            "{} {}",
            "[OK] Report saved to:".bold().green(),
            path.display()
        );
    }

    if report.succeeded {
        Ok(())
    } else {
        Err(Error::JobFailed(format!(
            "run {} did not complete",
            report.run_id
        )))
    }
}

/// Print a per-group summary of the run.
fn print_summary(report: &RunReport) {
    println!("{}", "[Run Summary]".bold());

    for group in &report.groups {
        if group.skipped {
            println!("  {} {}", "[SKIP]".dimmed(), group.name);
            continue;
        }

        let tag = if group.succeeded {
            "[OK]".green().bold()
        } else {
            "[FAILED]".red().bold()
        };
        println!("  {} {}", tag, group.name);

        for score in &group.jobs {
            let status = if score.succeeded { "ok" } else { "failed" };
            println!("    - {} ({})", score.job, status);

            for warning in &score.warnings {
                println!("      {} {}", "warning:".yellow(), warning);
            }
            for error in &score.errors {
                println!("      {} {}", "error:".red(), error);
            }
        }
    }

    println!();
    if report.succeeded {
        println!("{}", "[OK] Run completed".bold().green());
    } else {
        println!("{}", "[FAILED] Run did not complete".bold().red());
    }
}
