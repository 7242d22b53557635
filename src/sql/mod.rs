//! SQL builder family.
//!
//! Fluent builders for SELECT, INSERT, UPDATE and DELETE, all bound to a
//! table name and a [`Connection`](crate::core::db::Connection). Every
//! builder accumulates clauses in call order and renders them into a SQL
//! string with `?` placeholders plus the bound values in placeholder
//! order; values never appear in the SQL text itself.

pub mod delete;
pub mod insert;
pub mod join;
pub mod predicate;
pub mod select;
pub mod update;
pub mod value;

pub use delete::DeleteQuery;
pub use insert::InsertQuery;
pub use join::Join;
pub use predicate::{Predicate, WhereClause};
pub use select::SelectQuery;
pub use update::UpdateQuery;
pub use value::Value;

/// Stages a column/value pair: an already-staged column keeps its
/// position and takes the new value, a new column is appended.
pub(crate) fn stage(assignments: &mut Vec<(String, Value)>, column: String, value: Value) {
    match assignments.iter_mut().find(|(c, _)| *c == column) {
        Some(slot) => slot.1 = value,
        None => assignments.push((column, value)),
    }
}
