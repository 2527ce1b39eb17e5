//! Named database registry.

use crate::models::config::DatabaseConfig;
use crate::{Error, Result};
use rusqlite::Connection;
use std::collections::HashMap;
use std::time::Duration;

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Knows which databases exist and how to open connections to them.
///
/// Connection descriptors are opaque names; jobs never see paths.
#[derive(Debug)]
pub struct DatabaseManager {
    databases: HashMap<String, DatabaseConfig>,
}

impl DatabaseManager {
    /// Create a manager over the given named databases.
    pub fn new(databases: HashMap<String, DatabaseConfig>) -> Self {
        Self { databases }
    }

    /// True if the named database is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.databases.contains_key(name)
    }

    /// True if connections to the named database should be transacted.
    pub fn is_transactional(&self, name: &str) -> Result<bool> {
        self.databases
            .get(name)
            .map(|config| config.transactional)
            .ok_or_else(|| Error::UnknownDatabase(name.to_string()))
    }

    /// Open a new connection to the named database.
    ///
    /// The busy timeout is set so that an unavailable database surfaces an
    /// error instead of blocking a job indefinitely.
    pub fn open(&self, name: &str) -> Result<Connection> {
        let config = self
            .databases
            .get(name)
            .ok_or_else(|| Error::UnknownDatabase(name.to_string()))?;

        let connection = Connection::open(&config.path)?;
        connection.busy_timeout(BUSY_TIMEOUT)?;

        tracing::debug!("Opened database '{}' at {:?}", name, config.path);
        Ok(connection)
    }
}
