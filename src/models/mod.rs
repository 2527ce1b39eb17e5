//! Data models for scripts, configuration and run reports.

pub mod config;
pub mod report;
pub mod script;
