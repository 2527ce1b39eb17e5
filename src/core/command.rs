//! Scoped database commands.

use crate::{Error, Result};
use rusqlite::Connection;
use std::fmt;
use std::rc::Rc;

/// A single value produced by a scalar query.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Scalar {
    /// The integer value, if this scalar is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Integer(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Integer(value) => write!(f, "{}", value),
            Scalar::Real(value) => write!(f, "{}", value),
            Scalar::Text(value) => write!(f, "{}", value),
            Scalar::Blob(bytes) => write!(f, "<blob {} bytes>", bytes.len()),
        }
    }
}

impl From<rusqlite::types::Value> for Scalar {
    fn from(value: rusqlite::types::Value) -> Self {
        use rusqlite::types::Value;
        match value {
            Value::Null => Scalar::Null,
            Value::Integer(i) => Scalar::Integer(i),
            Value::Real(r) => Scalar::Real(r),
            Value::Text(s) => Scalar::Text(s),
            Value::Blob(b) => Scalar::Blob(b),
        }
    }
}

/// A command scoped to one database connection.
///
/// A command is acquired from a job context, used for one statement, and
/// released when it goes out of scope. The connection itself stays cached in
/// the owning scope; dropping the command never closes it early.
pub struct Command {
    connection: Rc<Connection>,
    text: String,
}

impl Command {
    pub(crate) fn new(connection: Rc<Connection>) -> Self {
        Self {
            connection,
            text: String::new(),
        }
    }

    /// The current query text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Set the query text.
    pub fn set_text<S: Into<String>>(&mut self, text: S) {
        self.text = text.into();
    }

    /// Execute the query and reduce the result to a single value.
    ///
    /// A query that yields no rows reduces to [`Scalar::Null`]; when the
    /// result has several rows or columns the first row's first column is
    /// taken. Invalid SQL and connection failures surface as
    /// [`Error::Query`].
    pub fn execute_scalar(&self) -> Result<Scalar> {
        self.ensure_text()?;

        let result = self
            .connection
            .query_row(&self.text, [], |row| row.get::<_, rusqlite::types::Value>(0));

        match result {
            Ok(value) => Ok(value.into()),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(Scalar::Null),
            Err(e) => Err(e.into()),
        }
    }

    /// Execute a statement that returns no rows, yielding the number of
    /// rows affected.
    pub fn execute(&self) -> Result<usize> {
        self.ensure_text()?;

        let changed = self.connection.execute(&self.text, [])?;
        Ok(changed)
    }

    fn ensure_text(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(Error::Query("no query text set".to_string()));
        }
        Ok(())
    }
}
