//! Log job.
//!
//! Logs a fixed message. Handy as a marker in long scripts and as a smoke
//! test that a group runs at all.

use crate::core::context::JobContext;
use crate::jobs::Job;
use crate::models::script::Settings;
use crate::Result;
use serde::Deserialize;

/// Logs a fixed message.
#[derive(Debug, Deserialize)]
pub struct LogJob {
    message: String,
}

impl LogJob {
    /// Build the job from a settings bag.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.deserialize()
    }
}

impl Job for LogJob {
    fn run(&self, ctx: &JobContext<'_>) -> Result<()> {
        ctx.log().info(self.message.clone());
        Ok(())
    }
}
