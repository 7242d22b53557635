//! DELETE queries.

use crate::core::db::Connection;
use crate::core::Result;
use crate::sql::{Value, WhereClause};

/// A DELETE bound to a table and connection. An empty where-clause
/// deletes every row.
#[derive(Debug, Clone)]
pub struct DeleteQuery {
    table: String,
    conn: Connection,
    filter: WhereClause,
}

impl DeleteQuery {
    pub fn new(table: impl Into<String>, conn: Connection) -> Self {
        DeleteQuery {
            table: table.into(),
            conn,
            filter: WhereClause::new(),
        }
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

    /// Renders `DELETE FROM t WHERE ...` and the bound parameters.
    pub fn build(&self) -> (String, Vec<Value>) {
        let mut sql = format!("DELETE FROM {}", self.table);
        let mut params = Vec::new();
        self.filter.render(&mut sql, &mut params);
        (sql, params)
    }

    /// Executes and returns the affected-row count.
    pub fn execute(&self) -> Result<usize> {
        let (sql, params) = self.build();
        self.conn.execute(&sql, &params)
    }
}
