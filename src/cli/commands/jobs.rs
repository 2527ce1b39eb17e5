//! Jobs command implementation.

use crate::jobs::JobRegistry;
use crate::Result;
use colored::Colorize;

/// List the registered job kinds.
pub fn list_jobs() -> Result<()> {
    let registry = JobRegistry::with_builtins();

    println!("{}", "[Registered job kinds]".bold());
    for kind in registry.kinds() {
        println!("  - {}", kind);
    }

    Ok(())
}
