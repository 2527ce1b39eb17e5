//! Run report model.
//!
//! A report records what happened during one run of a script: which groups
//! ran, how each job scored, and the log stream jobs produced.

use serde::Serialize;

/// The level of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// One line of the run's log stream.
#[derive(Debug, Clone, Serialize)]
pub struct LogLine {
    pub level: LogLevel,
    /// The `group.job` prefix identifying who logged the line.
    pub prefix: String,
    pub message: String,
}

/// The score for one job.
#[derive(Debug, Clone, Serialize)]
pub struct Score {
    /// The display name of the job.
    pub job: String,
    pub started_at: String,
    pub finished_at: String,
    pub succeeded: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Score {
    /// Start a score for the named job.
    pub fn start(job: &str) -> Self {
        Self {
            job: job.to_string(),
            started_at: chrono::Utc::now().to_rfc3339(),
            finished_at: String::new(),
            succeeded: false,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Mark the job as finished.
    pub fn finish(&mut self, succeeded: bool) {
        self.finished_at = chrono::Utc::now().to_rfc3339();
        self.succeeded = succeeded;
    }

    /// True if the job produced no errors or warnings.
    pub fn clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// The report for one group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub name: String,
    /// True when the group was not run (disabled or filtered out).
    pub skipped: bool,
    pub succeeded: bool,
    pub jobs: Vec<Score>,
}

impl GroupReport {
    /// A report for a group that was not run.
    pub fn skipped(name: &str) -> Self {
        Self {
            name: name.to_string(),
            skipped: true,
            succeeded: true,
            jobs: Vec::new(),
        }
    }
}

/// The report for one run of a script.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: String,
    pub finished_at: String,
    pub succeeded: bool,
    pub groups: Vec<GroupReport>,
    /// Everything the jobs logged, in order.
    pub log: Vec<LogLine>,
}

impl RunReport {
    /// Start a new report with a fresh run id.
    pub fn start() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: chrono::Utc::now().to_rfc3339(),
            finished_at: String::new(),
            succeeded: false,
            groups: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Mark the run as finished.
    pub fn finish(&mut self, succeeded: bool) {
        self.finished_at = chrono::Utc::now().to_rfc3339();
        self.succeeded = succeeded;
    }

    /// Log lines whose message contains the given text.
    pub fn find_log(&self, needle: &str) -> Vec<&LogLine> {
        self.log
            .iter()
            .filter(|line| line.message.contains(needle))
            .collect()
    }
}

/// Save a report to a JSON file.
pub fn save_report(report: &RunReport, path: &std::path::Path) -> crate::Result<()> {
    let json = serde_json::to_string_pretty(report)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;

    tracing::info!("Report saved to {:?}", path);
    Ok(())
}
