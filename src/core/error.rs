//! Error module.
//!
//! Defines the crate-wide error type and `Result` alias. Every fallible
//! operation in relite reports a `ReliteError`; nothing is retried or
//! recovered internally, errors surface to the immediate caller.
use thiserror::Error;

/// Error type covering every failure scenario in relite:
/// - driver-level database errors
/// - connection establishment (DSN construction, driver connect)
/// - configuration lookup and parsing
/// - query building and execution
/// - relation resolution on models
#[derive(Error, Debug)]
pub enum ReliteError {
    /// Driver-level errors from SQLite operations
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration errors (missing profiles, invalid parameters,
    /// empty file path for a file-based driver)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Driver-level connect failure, wrapping the underlying message
    /// and the DSN that was being connected
    #[error("Connection error: {message} ({dsn})")]
    Connection { message: String, dsn: String },

    /// The driver produced no usable handle despite reporting no error
    #[error("Null handle: no live handle for {0}")]
    NullHandle(String),

    /// Query building and execution errors
    #[error("Query error: {0}")]
    Query(String),

    /// Relation helpers given a record that cannot resolve the
    /// attributes the relation needs
    #[error("Relation error: {0}")]
    Relation(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic application errors for unexpected conditions
    #[error("Application error: {0}")]
    App(String),
}

/// Type alias for Result to use ReliteError as the error type.
pub type Result<T> = std::result::Result<T, ReliteError>;
