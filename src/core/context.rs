//! Job execution context.
//!
//! A job receives a [`JobContext`] as an explicit parameter when it runs.
//! The context exposes the three capabilities a job may use: a prefixed
//! logger, its settings bag, and a factory for commands scoped to named
//! databases. Everything else belongs to the host.

use crate::core::command::Command;
use crate::core::database::DatabaseManager;
use crate::models::report::{LogLevel, LogLine};
use crate::models::script::Settings;
use crate::{Error, Result};
use rusqlite::Connection;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

/// The shared log stream for one run.
pub type LogSink = Rc<RefCell<Vec<LogLine>>>;

/// A prefixed logger bound to one job.
///
/// Lines go to the run's log stream and are mirrored to `tracing`.
#[derive(Clone)]
pub struct JobLog {
    prefix: String,
    sink: LogSink,
    verbose: bool,
}

impl JobLog {
    /// Create a log with the given `group.job` prefix.
    pub fn new(prefix: &str, sink: LogSink, verbose: bool) -> Self {
        Self {
            prefix: prefix.to_string(),
            sink,
            verbose,
        }
    }

    /// Log an informational message.
    pub fn info<S: Into<String>>(&self, message: S) {
        let message = message.into();
        tracing::info!("[{}] {}", self.prefix, message);
        self.push(LogLevel::Info, message);
    }

    /// Log a warning.
    pub fn warn<S: Into<String>>(&self, message: S) {
        let message = message.into();
        tracing::warn!("[{}] {}", self.prefix, message);
        self.push(LogLevel::Warn, message);
    }

    /// Log an error.
    pub fn error<S: Into<String>>(&self, message: S) {
        let message = message.into();
        tracing::error!("[{}] {}", self.prefix, message);
        self.push(LogLevel::Error, message);
    }

    /// Log a debug message. Dropped unless the job is verbose.
    pub fn debug<S: Into<String>>(&self, message: S) {
        if !self.verbose {
            return;
        }
        let message = message.into();
        tracing::debug!("[{}] {}", self.prefix, message);
        self.push(LogLevel::Debug, message);
    }

    fn push(&self, level: LogLevel, message: String) {
        self.sink.borrow_mut().push(LogLine {
            level,
            prefix: self.prefix.clone(),
            message,
        });
    }
}

/// Group-scoped database connections.
///
/// The first command against a database opens a connection (and begins a
/// transaction when both the scope and the database are transactional);
/// later commands against the same database reuse it. The scope is finalized
/// exactly once with [`commit`](ConnectionScope::commit) or
/// [`rollback`](ConnectionScope::rollback), after which every cached
/// connection is dropped. Connections are never shared across scopes.
pub struct ConnectionScope {
    manager: Rc<DatabaseManager>,
    connections: RefCell<HashMap<String, Rc<Connection>>>,
    transacted: RefCell<Vec<String>>,
    use_transactions: bool,
}

impl ConnectionScope {
    /// Create a scope over the given databases.
    pub fn new(manager: Rc<DatabaseManager>, use_transactions: bool) -> Self {
        Self {
            manager,
            connections: RefCell::new(HashMap::new()),
            transacted: RefCell::new(Vec::new()),
            use_transactions,
        }
    }

    /// Create a command bound to the named database.
    pub fn command(&self, database: &str) -> Result<Command> {
        if let Some(connection) = self.connections.borrow().get(database) {
            return Ok(Command::new(connection.clone()));
        }

        let connection = self.manager.open(database)?;

        if self.use_transactions && self.manager.is_transactional(database)? {
            connection.execute_batch("BEGIN")?;
            self.transacted.borrow_mut().push(database.to_string());
            tracing::debug!("Began transaction on '{}'", database);
        }

        let connection = Rc::new(connection);
        self.connections
            .borrow_mut()
            .insert(database.to_string(), connection.clone());

        Ok(Command::new(connection))
    }

    /// Commit every transacted connection, then release all connections.
    pub fn commit(&self) -> Result<()> {
        self.finalize("COMMIT")
    }

    /// Roll back every transacted connection, then release all connections.
    pub fn rollback(&self) -> Result<()> {
        self.finalize("ROLLBACK")
    }

    /// The number of connections currently held by the scope.
    pub fn open_connections(&self) -> usize {
        self.connections.borrow().len()
    }

    fn finalize(&self, action: &str) -> Result<()> {
        let mut failures = Vec::new();

        for database in self.transacted.borrow_mut().drain(..) {
            let connection = match self.connections.borrow().get(&database) {
                Some(connection) => connection.clone(),
                None => continue,
            };

            if let Err(e) = connection.execute_batch(action) {
                tracing::error!("Could not {} on '{}': {}", action, database, e);
                failures.push(format!("{}: {}", database, e));
            }
        }

        // Connections are released on every path, even when finalizing failed.
        self.connections.borrow_mut().clear();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::Query(format!(
                "{} failed on {}",
                action.to_lowercase(),
                failures.join(", ")
            )))
        }
    }
}

/// The capabilities visible to one job during one invocation.
///
/// Created and owned by the runner; jobs only ever borrow it.
pub struct JobContext<'a> {
    log: JobLog,
    settings: &'a Settings,
    scope: &'a ConnectionScope,
    script_dir: &'a Path,
}

impl<'a> JobContext<'a> {
    /// Bundle up the context for one job invocation.
    pub fn new(
        log: JobLog,
        settings: &'a Settings,
        scope: &'a ConnectionScope,
        script_dir: &'a Path,
    ) -> Self {
        Self {
            log,
            settings,
            scope,
            script_dir,
        }
    }

    /// The job's logger.
    pub fn log(&self) -> &JobLog {
        &self.log
    }

    /// The job's settings bag.
    pub fn settings(&self) -> &Settings {
        self.settings
    }

    /// The directory the running script resides in.
    pub fn script_dir(&self) -> &Path {
        self.script_dir
    }

    /// Create a command bound to the named database.
    ///
    /// Connections are opened and cached per scope; the command itself is
    /// released when it goes out of scope.
    pub fn create_command(&self, database: &str) -> Result<Command> {
        self.scope.command(database)
    }
}
