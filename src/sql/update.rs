//! UPDATE queries.

use crate::core::db::Connection;
use crate::core::{ReliteError, Result};
use crate::record::Record;
use crate::sql::{stage, Value, WhereClause};

/// An UPDATE bound to a table and connection. Set-pairs keep their
/// staging order; bound parameters are the set-values followed by the
/// where-values, matching placeholder order.
#[derive(Debug, Clone)]
pub struct UpdateQuery {
    table: String,
    conn: Connection,
    assignments: Vec<(String, Value)>,
    filter: WhereClause,
}

impl UpdateQuery {
    pub fn new(table: impl Into<String>, conn: Connection) -> Self {
        UpdateQuery {
            table: table.into(),
            conn,
            assignments: Vec::new(),
            filter: WhereClause::new(),
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

    pub fn where_raw(mut self, fragment: impl Into<String>) -> Self {
        self.filter.raw(fragment);
        self
    }

    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        WhereClause::eq(&mut self.filter, column, value);
        self
    }

    pub fn where_op(
        mut self,
        column: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.filter.cmp(column, op, value);
        self
    }

    /// Renders `UPDATE t SET a = ?, b = ? WHERE ...`. Nothing staged is
    /// a query error. An empty where-clause updates every row.
    pub fn build(&self) -> Result<(String, Vec<Value>)> {
        if self.assignments.is_empty() {
            return Err(ReliteError::Query(
                "update has no values staged".to_string(),
            ));
        }

        let mut sql = format!("UPDATE {} SET ", self.table);
        let mut params = Vec::with_capacity(self.assignments.len() + self.filter.len());
        for (i, (column, value)) in self.assignments.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(column);
            sql.push_str(" = ?");
            params.push(value.clone());
        }
        self.filter.render(&mut sql, &mut params);
        Ok((sql, params))
    }

    /// Executes and returns the affected-row count; zero matching rows
    /// is `Ok(0)`, not an error.
    pub fn execute(&self) -> Result<usize> {
        let (sql, params) = self.build()?;
        self.conn.execute(&sql, &params)
    }
}
