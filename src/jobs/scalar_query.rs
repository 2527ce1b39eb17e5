//! Scalar query job.
//!
//! Runs a query that reduces to a single value against a named database and
//! logs the result, e.g. `There are 3 rows`.

use crate::core::context::JobContext;
use crate::jobs::Job;
use crate::models::script::Settings;
use crate::{Error, Result};
use serde::Deserialize;

/// Runs a scalar query and logs the formatted result.
#[derive(Debug, Deserialize)]
pub struct ScalarQueryJob {
    /// The database to query.
    #[serde(default)]
    database: Option<String>,

    /// The query text. Must reduce to a single value.
    query: String,

    /// Message template; the first `{}` is replaced with the value.
    #[serde(default = "default_message")]
    message: String,
}

fn default_message() -> String {
    "{}".to_string()
}

impl ScalarQueryJob {
    /// Build the job from a settings bag.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let job: Self = settings.deserialize()?;
        if job.database.is_none() {
            return Err(Error::MissingSetting("database".to_string()));
        }
        Ok(job)
    }
}

impl Job for ScalarQueryJob {
    fn run(&self, ctx: &JobContext<'_>) -> Result<()> {
        let database = self
            .database
            .as_deref()
            .ok_or_else(|| Error::MissingSetting("database".to_string()))?;

        let mut command = ctx.create_command(database)?;
        command.set_text(&self.query);

        let value = command.execute_scalar()?;
        ctx.log().debug(format!("scalar query yielded {}", value));
        ctx.log()
            .info(self.message.replacen("{}", &value.to_string(), 1));

        Ok(())
    }
}
