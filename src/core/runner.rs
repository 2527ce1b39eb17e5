//! Script runner.
//!
//! Runs the groups of a script in order. Each group gets its own connection
//! scope: the scope commits when every job in the group succeeds and rolls
//! back otherwise. A failed group stops the run unless the group allows
//! failure.

use crate::core::context::{ConnectionScope, JobContext, JobLog, LogSink};
use crate::core::database::DatabaseManager;
use crate::jobs::{null::NullJob, Job, JobRegistry};
use crate::models::report::{GroupReport, LogLevel, RunReport, Score};
use crate::models::script::{GroupSpec, JobSpec, Script};
use crate::{Error, Result};
use std::cell::RefCell;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

/// Which groups of a script to run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RunConfig {
    /// Run every group.
    #[default]
    All,
    /// Run a single group.
    Single(String),
    /// Run from a given group to the end of the script.
    From(String),
}

impl RunConfig {
    /// Work out which groups the config selects, by position.
    ///
    /// Group names are matched case-insensitively.
    fn select(&self, script: &Script) -> Result<Vec<bool>> {
        let count = script.groups.len();

        match self {
            RunConfig::All => Ok(vec![true; count]),
            RunConfig::Single(name) => {
                let index = find_group(script, name)?;
                let mut selected = vec![false; count];
                selected[index] = true;
                Ok(selected)
            }
            RunConfig::From(name) => {
                let index = find_group(script, name)?;
                Ok((0..count).map(|i| i >= index).collect())
            }
        }
    }
}

impl fmt::Display for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunConfig::All => write!(f, "all groups"),
            RunConfig::Single(name) => write!(f, "only group '{}'", name),
            RunConfig::From(name) => write!(f, "from group '{}'", name),
        }
    }
}

fn find_group(script: &Script, name: &str) -> Result<usize> {
    script
        .groups
        .iter()
        .position(|group| group.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| Error::UnknownGroup(name.to_string()))
}

/// Runs scripts.
pub struct Runner {
    registry: JobRegistry,
    run_config: RunConfig,
    live: bool,
    verbose: bool,
}

impl Runner {
    /// A runner with the builtin jobs, running all groups in test mode.
    pub fn new() -> Self {
        Self::with_registry(JobRegistry::with_builtins())
    }

    /// A runner using a custom job registry.
    pub fn with_registry(registry: JobRegistry) -> Self {
        Self {
            registry,
            run_config: RunConfig::All,
            live: false,
            verbose: false,
        }
    }

    /// Select which groups run.
    pub fn run_config(mut self, run_config: RunConfig) -> Self {
        self.run_config = run_config;
        self
    }

    /// Run jobs for real. When off, every job is replaced by the null job.
    pub fn live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    /// Verbose logging for every job, regardless of what the script says.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run a script. `script_dir` is the directory the script was loaded
    /// from; jobs resolve relative paths against it.
    ///
    /// A run that fails still produces a report; check
    /// [`RunReport::succeeded`].
    pub fn run(&self, script: &Script, script_dir: &Path) -> Result<RunReport> {
        if self.live {
            tracing::info!("RUNNING IN LIVE MODE");
        } else {
            tracing::info!("Running in test mode");
        }
        tracing::info!("Run config: {}", self.run_config);

        let selected = self.run_config.select(script)?;
        let manager = Rc::new(DatabaseManager::new(script.databases.clone()));
        let sink: LogSink = Rc::new(RefCell::new(Vec::new()));

        let mut report = RunReport::start();
        let mut succeeded = true;

        for (group, selected) in script.groups.iter().zip(selected) {
            if !selected || !group.enabled {
                tracing::debug!("Skipping group '{}'", group.name);
                report.groups.push(GroupReport::skipped(&group.name));
                continue;
            }

            let group_report = self.run_group(group, manager.clone(), script_dir, &sink);
            let group_succeeded = group_report.succeeded;
            report.groups.push(group_report);

            if !group_succeeded {
                if group.allow_fail {
                    tracing::warn!("Group '{}' failed, but this is allowed", group.name);
                } else {
                    succeeded = false;
                    break;
                }
            }
        }

        report.log = std::mem::take(&mut *sink.borrow_mut());
        report.finish(succeeded);
        Ok(report)
    }

    fn run_group(
        &self,
        group: &GroupSpec,
        manager: Rc<DatabaseManager>,
        script_dir: &Path,
        sink: &LogSink,
    ) -> GroupReport {
        tracing::info!("Running group '{}'", group.name);

        let scope = ConnectionScope::new(manager, group.transactional);
        let mut jobs = Vec::new();
        let mut failed = false;

        for spec in &group.jobs {
            let score = self.run_job(group, spec, &scope, script_dir, sink);
            let job_succeeded = score.succeeded;
            jobs.push(score);

            if !job_succeeded {
                failed = true;
                break;
            }
        }

        let finalized = if failed {
            scope.rollback()
        } else {
            scope.commit()
        };

        if let Err(e) = finalized {
            tracing::error!("Could not finalize group '{}': {}", group.name, e);
            failed = true;
        }

        GroupReport {
            name: group.name.clone(),
            skipped: false,
            succeeded: !failed,
            jobs,
        }
    }

    fn run_job(
        &self,
        group: &GroupSpec,
        spec: &JobSpec,
        scope: &ConnectionScope,
        script_dir: &Path,
        sink: &LogSink,
    ) -> Score {
        let name = spec.display_name();
        let prefix = format!("{}.{}", group.name, name);
        let verbose = group.verbose || self.verbose;

        tracing::info!("Running job '{}'", prefix);

        let mut score = Score::start(name);
        let mark = sink.borrow().len();

        let log = JobLog::new(&prefix, sink.clone(), verbose);
        let ctx = JobContext::new(log, &spec.settings, scope, script_dir);

        let outcome = self
            .build_job(spec)
            .and_then(|job| job.run(&ctx));

        // Fold warnings and errors the job logged into its score.
        for line in sink.borrow().iter().skip(mark) {
            match line.level {
                LogLevel::Warn => score.warnings.push(line.message.clone()),
                LogLevel::Error => score.errors.push(line.message.clone()),
                _ => {}
            }
        }

        match outcome {
            Ok(()) => score.finish(true),
            Err(e) => {
                tracing::error!("Job '{}' failed: {}", prefix, e);
                score.errors.push(e.to_string());
                score.finish(false);
            }
        }

        score
    }

    fn build_job(&self, spec: &JobSpec) -> Result<Box<dyn Job>> {
        if !self.live {
            return Ok(Box::new(NullJob));
        }
        self.registry.build(&spec.kind, &spec.settings)
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}
