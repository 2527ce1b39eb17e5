//! Jobs and the job registry.
//!
//! A job is anything that can run against a [`JobContext`]. Scripts refer to
//! jobs by their registered kind; the registry builds an instance from the
//! job's settings bag.

pub mod log_message;
pub mod null;
pub mod scalar_query;
pub mod sql;

use crate::core::context::JobContext;
use crate::models::script::Settings;
use crate::{Error, Result};
use std::collections::HashMap;

/// A runnable job.
///
/// The context is passed explicitly; jobs hold no ambient state between
/// invocations.
pub trait Job {
    fn run(&self, ctx: &JobContext<'_>) -> Result<()>;
}

/// Plain functions and closures are jobs too.
impl<F> Job for F
where
    F: Fn(&JobContext<'_>) -> Result<()>,
{
    fn run(&self, ctx: &JobContext<'_>) -> Result<()> {
        self(ctx)
    }
}

impl std::fmt::Debug for dyn Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Job")
    }
}

/// Builds a job instance from its settings bag.
pub type JobBuilder = Box<dyn Fn(&Settings) -> Result<Box<dyn Job>>>;

/// Maps job kinds to builders.
pub struct JobRegistry {
    builders: HashMap<String, JobBuilder>,
}

impl JobRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// A registry with every builtin job registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("scalar-query", |settings| {
            Ok(Box::new(scalar_query::ScalarQueryJob::from_settings(settings)?))
        });
        registry.register("sql", |settings| {
            Ok(Box::new(sql::SqlJob::from_settings(settings)?))
        });
        registry.register("log", |settings| {
            Ok(Box::new(log_message::LogJob::from_settings(settings)?))
        });
        registry.register("null", |_| Ok(Box::new(null::NullJob)));
        registry
    }

    /// Register a builder under the given kind, replacing any previous one.
    pub fn register<F>(&mut self, kind: &str, builder: F)
    where
        F: Fn(&Settings) -> Result<Box<dyn Job>> + 'static,
    {
        self.builders.insert(kind.to_string(), Box::new(builder));
    }

    /// True if the kind is registered.
    pub fn contains(&self, kind: &str) -> bool {
        self.builders.contains_key(kind)
    }

    /// Build a job of the given kind.
    pub fn build(&self, kind: &str, settings: &Settings) -> Result<Box<dyn Job>> {
        match self.builders.get(kind) {
            Some(builder) => builder(settings),
            None => Err(Error::UnknownJobType(kind.to_string())),
        }
    }

    /// The registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_registered() {
        let registry = JobRegistry::with_builtins();
        assert_eq!(registry.kinds(), vec!["log", "null", "scalar-query", "sql"]);
    }

    #[test]
    fn test_unknown_kind() {
        let registry = JobRegistry::new();
        let err = registry.build("missing", &Settings::default()).unwrap_err();
        assert!(matches!(err, Error::UnknownJobType(_)));
    }

    #[test]
    fn test_register_custom_builder() {
        fn noop(_: &JobContext<'_>) -> Result<()> {
            Ok(())
        }

        let mut registry = JobRegistry::new();
        registry.register("noop", |_| Ok(Box::new(noop)));

        assert!(registry.contains("noop"));
        registry.build("noop", &Settings::default()).unwrap();
    }
}
