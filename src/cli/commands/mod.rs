//! CLI command implementations.

pub mod jobs;
pub mod run;
pub mod validate;
