//! Database module.
//!
//! The database layer is split into three concerns:
//! - **Connection reuse** (`registry.rs`): one live native handle per
//!   connection fingerprint, owned by an explicit registry
//! - **Connections** (`connection.rs`): configuration, DSN construction
//!   and the wrapper the query builders execute through
//! - **Schema introspection** (`schema.rs`): lazily-built metadata about
//!   the connected database
//!
//! All operations use the standardized `ReliteError` type for consistent
//! error propagation.

pub mod connection;
pub mod registry;
pub mod schema;

pub use connection::*;
pub use registry::*;
pub use schema::*;
