//! WHERE-clause predicates.
//!
//! Predicates are tagged variants rather than an overloaded `where`
//! call: a raw fragment, an equality, an explicit comparison, or a set
//! membership. They accumulate in call order with implicit AND
//! semantics, and that order is exactly the order of the emitted SQL and
//! its bound parameters.
//!
//! Column names are emitted verbatim; the caller is the trust boundary
//! for identifiers.

use crate::sql::Value;

/// One WHERE-clause condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// A raw SQL fragment, spliced as-is
    Raw(String),
    /// `column = ?`
    Eq { column: String, value: Value },
    /// `column <op> ?`
    Cmp {
        column: String,
        op: String,
        value: Value,
    },
    /// `column IN (?, ?, ...)`
    In { column: String, values: Vec<Value> },
}

impl Predicate {
    fn render(&self, sql: &mut String, params: &mut Vec<Value>) {
        match self {
            Predicate::Raw(fragment) => sql.push_str(fragment),
            Predicate::Eq { column, value } => {
                sql.push_str(column);
                sql.push_str(" = ?");
                params.push(value.clone());
            }
            Predicate::Cmp { column, op, value } => {
                sql.push_str(column);
                sql.push(' ');
                sql.push_str(op);
                sql.push_str(" ?");
                params.push(value.clone());
            }
            Predicate::In { column, values } => {
                let marks = vec!["?"; values.len()].join(", ");
                sql.push_str(column);
                sql.push_str(" IN (");
                sql.push_str(&marks);
                sql.push(')');
                params.extend(values.iter().cloned());
            }
        }
    }
}

/// An ordered accumulation of predicates, AND-joined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    predicates: Vec<Predicate>,
}

impl WhereClause {
    pub fn new() -> Self {
        WhereClause::default()
    }

    pub fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    pub fn raw(&mut self, fragment: impl Into<String>) {
        self.push(Predicate::Raw(fragment.into()));
    }

    pub fn eq(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.push(Predicate::Eq {
            column: column.into(),
            value: value.into(),
        });
    }

    pub fn cmp(
        &mut self,
        column: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<Value>,
    ) {
        self.push(Predicate::Cmp {
            column: column.into(),
            op: op.into(),
            value: value.into(),
        });
    }

    pub fn within<I>(&mut self, column: impl Into<String>, values: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.push(Predicate::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Appends ` WHERE p1 AND p2 ...` to `sql`, pushing bound values
    /// onto `params` in placeholder order. Appends nothing when empty.
    pub fn render(&self, sql: &mut String, params: &mut Vec<Value>) {
        for (i, predicate) in self.predicates.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            predicate.render(sql, params);
        }
    }
}
