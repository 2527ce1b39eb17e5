//! Null job.
//!
//! Does nothing. The runner substitutes it for every job when it is not in
//! live mode, so a script can be walked end to end without side effects.

use crate::core::context::JobContext;
use crate::jobs::Job;
use crate::Result;

/// A job that does nothing.
pub struct NullJob;

impl Job for NullJob {
    fn run(&self, ctx: &JobContext<'_>) -> Result<()> {
        ctx.log().info("skipped (test mode)");
        Ok(())
    }
}
