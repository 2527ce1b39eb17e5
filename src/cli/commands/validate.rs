//! Validate command implementation.
//!
//! Parses a script and checks that every job kind is registered and that
//! every database a job refers to is declared.

use crate::jobs::JobRegistry;
use crate::models::config;
use crate::models::script::load_script;
use crate::{Error, Result};
use colored::Colorize;
use std::path::Path;

/// Validate a script file without running it.
pub fn validate(script_path: &Path) -> Result<()> {
    println!("[INFO] Validating script: {}", script_path.display());

    let mut script = load_script(script_path)?;
    script.merge_default_databases(config::load_config().databases);

    let registry = JobRegistry::with_builtins();
    let mut errors = Vec::new();

    for group in &script.groups {
        for job in &group.jobs {
            if !registry.contains(&job.kind) {
                errors.push(format!(
                    "group '{}', job '{}': unknown job type '{}'",
                    group.name,
                    job.display_name(),
                    job.kind
                ));
            }

            if let Some(database) = job.settings.get_str("database") {
                if !script.databases.contains_key(database) {
                    errors.push(format!(
                        "group '{}', job '{}': unknown database '{}'",
                        group.name,
                        job.display_name(),
                        database
                    ));
                }
            }
        }
    }

    if !errors.is_empty() {
        println!("{}", "[FAILED] Validation failed:".bold().red());
        for error in &errors {
            println!("  - {}", error);
        }
        return Err(Error::InvalidScript(format!(
            "{} errors found",
            errors.len()
        )));
    }

    println!(
        "{} {} groups, {} jobs",
        "[OK] Validation passed:".bold().green(),
        script.groups.len(),
        script.groups.iter().map(|g| g.jobs.len()).sum::<usize>()
    );
    Ok(())
}
