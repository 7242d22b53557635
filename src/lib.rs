//! relite — a minimal active-record ORM and fluent SQL query builder
//! for SQLite.
//!
//! The crate is a library consumed by an application layer: connection
//! profiles come from configuration, equal profiles share one live
//! native handle through a connection registry, and entities delegate
//! their CRUD to parameterized query builders.

// Core infrastructure modules
pub mod core;

// Feature-specific modules
pub mod config;
pub mod model;
pub mod naming;
pub mod record;
pub mod sql;

// Re-export the types most callers need
pub use crate::core::db::{
    Connection, ConnectionConfig, ConnectionRegistry, Driver, Prepared, Schema,
};
pub use crate::core::{ReliteError, Result};
pub use config::Config;
pub use model::Model;
pub use record::{FromRecord, Record};
pub use sql::{DeleteQuery, InsertQuery, Join, Predicate, SelectQuery, UpdateQuery, Value};
