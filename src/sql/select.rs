//! SELECT queries.

use crate::core::db::Connection;
use crate::record::{FromRecord, Record};
use crate::sql::{Join, Value, WhereClause};
use std::marker::PhantomData;

/// A SELECT bound to a table and connection, generic over the result
/// type rows are mapped into (a plain [`Record`] unless an entity type
/// is configured through the type parameter).
///
/// Clauses accumulate in call order and render in that order.
#[derive(Debug, Clone)]
pub struct SelectQuery<M = Record> {
    table: String,
    conn: Connection,
    columns: Option<Vec<String>>,
    joins: Vec<Join>,
    filter: WhereClause,
    order: Vec<String>,
    limit: Option<u64>,
    marker: PhantomData<M>,
}

impl<M: FromRecord> SelectQuery<M> {
    pub fn new(table: impl Into<String>, conn: Connection) -> Self {
        SelectQuery {
            table: table.into(),
            conn,
            columns: None,
            joins: Vec::new(),
            filter: WhereClause::new(),
            order: Vec::new(),
            limit: None,
            marker: PhantomData,
        }
    }

    /// Restricts the emitted columns; without this the query selects
    /// `*`.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Adds a raw predicate fragment.
    pub fn where_raw(mut self, fragment: impl Into<String>) -> Self {
        self.filter.raw(fragment);
        self
    }

    /// Adds an equality predicate.
    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        WhereClause::eq(&mut self.filter, column, value);
        self
    }

    /// Adds a predicate with an explicit operator.
    pub fn where_op(
        mut self,
        column: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.filter.cmp(column, op, value);
        self
    }

    /// Adds a set-membership predicate.
    pub fn where_in<I>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.filter.within(column, values);
        self
    }

    /// Appends an ordering fragment (e.g. `"name"` or `"age DESC"`).
    pub fn order_by(mut self, fragment: impl Into<String>) -> Self {
        self.order.push(fragment.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Renders the SQL string and its bound parameters, in placeholder
    /// order.
    pub fn build(&self) -> (String, Vec<Value>) {
        let mut sql = String::from("SELECT ");
        match &self.columns {
            Some(columns) => sql.push_str(&columns.join(", ")),
            None => sql.push('*'),
        }
        sql.push_str(" FROM ");
        sql.push_str(&self.table);

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.render());
        }

        let mut params = Vec::new();
        self.filter.render(&mut sql, &mut params);

        if !self.order.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order.join(", "));
        }
        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ");
            sql.push_str(&limit.to_string());
        }

        (sql, params)
    }

    /// Executes and materializes every row.
    pub fn get(&self) -> crate::core::Result<Vec<M>> {
        let (sql, params) = self.build();
        let rows = self.conn.query(&sql, &params)?;
        rows.into_iter().map(M::from_record).collect()
    }

    /// Executes and returns the first row, or `None`. "No row" is not
    /// an error.
    pub fn first(&self) -> crate::core::Result<Option<M>> {
        Ok(self.get()?.into_iter().next())
    }
}
