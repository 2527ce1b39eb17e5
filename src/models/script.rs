//! Script model.
//!
//! A script (a "run sheet") is a TOML file declaring the databases jobs may
//! talk to and the groups of jobs to run:
//!
//! ```toml
//! [databases.main]
//! path = "jobs.db"
//!
//! [[group]]
//! name = "counts"
//!
//! [[group.job]]
//! type = "scalar-query"
//! database = "main"
//! query = "SELECT COUNT(*) FROM Locations"
//! message = "There are {} rows"
//! ```

use crate::models::config::DatabaseConfig;
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// A parsed script.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Script {
    /// Databases the script declares, overriding any user-level defaults.
    #[serde(default)]
    pub databases: HashMap<String, DatabaseConfig>,

    /// The groups of jobs, in run order.
    #[serde(default, rename = "group")]
    pub groups: Vec<GroupSpec>,
}

impl Script {
    /// Merge user-level database defaults into the script.
    ///
    /// Databases declared by the script win over defaults with the same name.
    pub fn merge_default_databases(&mut self, defaults: HashMap<String, DatabaseConfig>) {
        for (name, config) in defaults {
            self.databases.entry(name).or_insert(config);
        }
    }
}

/// A group of jobs that run together and commit or roll back together.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupSpec {
    /// The name of the group.
    pub name: String,

    /// Only enabled groups are run.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// If the group is allowed to fail without stopping the run.
    #[serde(default)]
    pub allow_fail: bool,

    /// Whether transactional databases are wrapped in a transaction
    /// for the duration of the group.
    #[serde(default = "default_true")]
    pub transactional: bool,

    /// Verbose logging for every job in the group.
    #[serde(default)]
    pub verbose: bool,

    /// The jobs that make up the group.
    #[serde(default, rename = "job")]
    pub jobs: Vec<JobSpec>,
}

fn default_true() -> bool {
    true
}

/// One job entry inside a group.
#[derive(Debug, Clone, Deserialize)]
pub struct JobSpec {
    /// The registered job kind, e.g. `scalar-query`.
    #[serde(rename = "type")]
    pub kind: String,

    /// A user defined name for the job.
    #[serde(default)]
    pub name: Option<String>,

    /// Everything else in the job table is the job's settings bag.
    #[serde(flatten)]
    pub settings: Settings,
}

impl JobSpec {
    /// The display name of the job, falling back to its kind.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.kind)
    }
}

/// The settings bag handed to a job.
///
/// Values are opaque to the runner; jobs pull out what they need, typically
/// by deserializing the whole bag into their own settings struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Settings(toml::Table);

impl Settings {
    /// Create a settings bag from a TOML table.
    pub fn new(table: toml::Table) -> Self {
        Self(table)
    }

    /// Look up a raw setting value.
    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.0.get(key)
    }

    /// Look up a string setting.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    /// Look up a string setting, failing if it is absent or not a string.
    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.get_str(key)
            .ok_or_else(|| Error::MissingSetting(key.to_string()))
    }

    /// The conventional `database` setting naming the connection descriptor
    /// the job's commands should be bound to.
    pub fn database(&self) -> Result<&str> {
        self.require_str("database")
    }

    /// Deserialize the whole bag into a typed settings struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        toml::Value::Table(self.0.clone())
            .try_into()
            .map_err(Error::Toml)
    }
}

/// Load a script from a TOML file.
pub fn load_script(path: &Path) -> Result<Script> {
    if !path.exists() {
        return Err(Error::ScriptNotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    let script: Script = toml::from_str(&content)?;

    for group in &script.groups {
        if group.name.trim().is_empty() {
            return Err(Error::InvalidScript("group with an empty name".to_string()));
        }
    }

    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"
        [databases.main]
        path = "jobs.db"

        [[group]]
        name = "counts"

        [[group.job]]
        type = "scalar-query"
        database = "main"
        query = "SELECT COUNT(*) FROM Locations"
        message = "There are {} rows"
    "#;

    #[test]
    fn test_parse_script() {
        let script: Script = toml::from_str(SCRIPT).unwrap();

        assert_eq!(script.databases.len(), 1);
        assert_eq!(script.groups.len(), 1);

        let group = &script.groups[0];
        assert_eq!(group.name, "counts");
        assert!(group.enabled);
        assert!(group.transactional);
        assert!(!group.allow_fail);

        let job = &group.jobs[0];
        assert_eq!(job.kind, "scalar-query");
        assert_eq!(job.display_name(), "scalar-query");
        assert_eq!(job.settings.database().unwrap(), "main");
        assert_eq!(
            job.settings.get_str("message"),
            Some("There are {} rows")
        );
    }

    #[test]
    fn test_job_name_defaults_to_kind() {
        let script: Script = toml::from_str(
            r#"
            [[group]]
            name = "g"

            [[group.job]]
            type = "null"
            name = "do nothing"
        "#,
        )
        .unwrap();

        assert_eq!(script.groups[0].jobs[0].display_name(), "do nothing");
    }

    #[test]
    fn test_missing_setting() {
        let settings = Settings::default();
        let err = settings.database().unwrap_err();
        assert!(matches!(err, Error::MissingSetting(_)));
    }

    #[test]
    fn test_script_databases_win_over_defaults() {
        let mut script: Script = toml::from_str(SCRIPT).unwrap();
        let mut defaults = HashMap::new();
        defaults.insert("main".to_string(), DatabaseConfig::plain("other.db"));
        defaults.insert("audit".to_string(), DatabaseConfig::plain("audit.db"));

        script.merge_default_databases(defaults);

        assert_eq!(script.databases.len(), 2);
        assert_eq!(
            script.databases["main"].path,
            std::path::PathBuf::from("jobs.db")
        );
    }

    #[test]
    fn test_load_nonexistent_script() {
        let result = load_script(Path::new("/nonexistent/script.toml"));
        assert!(matches!(result, Err(Error::ScriptNotFound(_))));
    }
}
