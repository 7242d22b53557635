//! INSERT queries.

use crate::core::db::Connection;
use crate::core::{ReliteError, Result};
use crate::record::Record;
use crate::sql::{stage, Value};

/// An INSERT bound to a table and connection. Staged column/value pairs
/// keep their staging order; restaging a column overwrites its value in
/// place.
#[derive(Debug, Clone)]
pub struct InsertQuery {
    table: String,
    conn: Connection,
    assignments: Vec<(String, Value)>,
}

impl InsertQuery {
    pub fn new(table: impl Into<String>, conn: Connection) -> Self {
        InsertQuery {
            table: table.into(),
            conn,
            assignments: Vec::new(),
        }
    }

    /// Stages one column/value pair.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        stage(&mut self.assignments, column.into(), value.into());
        self
    }

    /// Stages every pair of an attribute bag.
    pub fn set_all(mut self, record: &Record) -> Self {
        for (column, value) in record.iter() {
            stage(&mut self.assignments, column.to_string(), value.clone());
        }
        self
    }

    /// Renders `INSERT INTO t (a, b) VALUES (?, ?)` with the staged
    /// values in placeholder order. Nothing staged is a query error.
    pub fn build(&self) -> Result<(String, Vec<Value>)> {
        if self.assignments.is_empty() {
            return Err(ReliteError::Query(
                "insert has no values staged".to_string(),
            ));
        }

        let columns: Vec<&str> = self.assignments.iter().map(|(c, _)| c.as_str()).collect();
        let marks = vec!["?"; self.assignments.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            marks
        );
        let params = self.assignments.iter().map(|(_, v)| v.clone()).collect();
        Ok((sql, params))
    }

    /// Executes through the connection's prepared-statement path and
    /// returns the driver's last-insert-id. Driver failures (including
    /// constraint violations) propagate; they are never flattened into a
    /// sentinel.
    pub fn execute(&self) -> Result<i64> {
        let (sql, params) = self.build()?;
        self.conn.execute(&sql, &params)?;
        Ok(self.conn.last_insert_id())
    }
}
