//! SQL job.
//!
//! Executes one or more non-query statements against a named database.
//! Statements run through the group's connection scope, so on transactional
//! databases they commit or roll back with the group.

use crate::core::context::JobContext;
use crate::jobs::Job;
use crate::models::script::Settings;
use crate::{Error, Result};
use serde::Deserialize;

/// Runs SQL statements against a named database.
#[derive(Debug, Deserialize)]
pub struct SqlJob {
    /// The database to run against.
    database: String,

    /// Statements to execute, in order.
    #[serde(default)]
    statements: Vec<String>,

    /// A file of statements, resolved against the script directory.
    #[serde(default)]
    file: Option<String>,
}

impl SqlJob {
    /// Build the job from a settings bag.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let job: Self = settings.deserialize()?;
        if job.statements.is_empty() && job.file.is_none() {
            return Err(Error::invalid_setting(
                "statements",
                "expected statements or a file",
            ));
        }
        Ok(job)
    }

    fn load_statements(&self, ctx: &JobContext<'_>) -> Result<Vec<String>> {
        let mut statements = self.statements.clone();

        if let Some(ref file) = self.file {
            let path = ctx.script_dir().join(file);
            let content = std::fs::read_to_string(&path)?;

            statements.extend(
                content
                    .split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from),
            );
        }

        Ok(statements)
    }
}

impl Job for SqlJob {
    fn run(&self, ctx: &JobContext<'_>) -> Result<()> {
        let statements = self.load_statements(ctx)?;

        let mut total = 0;
        for statement in &statements {
            let mut command = ctx.create_command(&self.database)?;
            command.set_text(statement);
            total += command.execute()?;
        }

        ctx.log().info(format!(
            "executed {} statements, {} rows affected",
            statements.len(),
            total
        ));
        Ok(())
    }
}
