//! Connection management module.
//!
//! Provides connection configuration, DSN construction and the
//! `Connection` wrapper the query builders execute through. A wrapper
//! does not own its native handle; it resolves one through a
//! [`ConnectionRegistry`] keyed by the connection's fingerprint, so all
//! wrappers built from equal configurations share a single live handle.

use crate::core::db::registry::{ConnectionRegistry, Handle};
use crate::core::db::schema::Schema;
use crate::core::{ReliteError, Result};
use crate::record::Record;
use crate::sql::Value;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Default prefix under which file-based databases live.
const DEFAULT_STORAGE_ROOT: &str = "storage";

/// Supported database drivers.
///
/// `Sqlite` is the embedded file-based driver this build links against.
/// `Mysql` exists at the configuration and DSN level; connecting with it
/// fails because no native MySQL client is compiled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    Sqlite,
    Mysql,
}

impl Driver {
    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::Sqlite => "sqlite",
            Driver::Mysql => "mysql",
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters describing one database connection. Immutable once
/// constructed; equal configs produce equal fingerprints and therefore
/// share one live handle.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    pub driver: Driver,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub database: String,
    #[serde(default, rename = "user")]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Database file path for file-based drivers, relative to the
    /// storage root.
    #[serde(default)]
    pub path: String,
    /// Per-profile override of the storage root; falls back to the
    /// configuration-wide root, then to `"storage"`.
    #[serde(default)]
    pub storage_root: Option<PathBuf>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            driver: Driver::Sqlite,
            host: String::new(),
            port: 0,
            database: String::new(),
            username: String::new(),
            password: String::new(),
            path: String::new(),
            storage_root: None,
        }
    }
}

impl ConnectionConfig {
    /// The storage-root prefix for this profile.
    pub fn storage_root(&self) -> PathBuf {
        self.storage_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_ROOT))
    }

    /// Full path of the database file (file-based drivers only).
    pub fn database_file(&self) -> PathBuf {
        self.storage_root().join(&self.path)
    }

    /// Builds the DSN for this configuration. The DSN doubles as the
    /// registry fingerprint. Neither form embeds credentials; username
    /// and password travel to the driver separately.
    ///
    /// Fails with a `Config` error when a file-based config has an empty
    /// path, before any filesystem or driver work happens.
    pub fn dsn(&self) -> Result<String> {
        match self.driver {
            Driver::Sqlite => {
                if self.path.is_empty() {
                    return Err(ReliteError::Config(
                        "unable to connect to sqlite: path is empty".to_string(),
                    ));
                }
                Ok(format!("sqlite:{}", self.database_file().display()))
            }
            Driver::Mysql => Ok(format!(
                "mysql:host={};port={};dbname={};charset=utf8",
                self.host, self.port, self.database
            )),
        }
    }
}

/// A connection wrapper bound to one configuration.
///
/// Cheap to construct and clone; the native handle lives in the registry
/// and is resolved by fingerprint on every operation, so dropping a
/// wrapper never closes the handle.
#[derive(Clone)]
pub struct Connection {
    config: ConnectionConfig,
    registry: Arc<ConnectionRegistry>,
    fingerprint: Option<String>,
}

impl Connection {
    /// Creates an unconnected wrapper resolving handles through the
    /// process-wide registry.
    pub fn new(config: ConnectionConfig) -> Self {
        Connection::with_registry(config, ConnectionRegistry::global())
    }

    /// Creates an unconnected wrapper resolving handles through an
    /// explicitly owned registry.
    pub fn with_registry(config: ConnectionConfig, registry: Arc<ConnectionRegistry>) -> Self {
        Connection {
            config,
            registry,
            fingerprint: None,
        }
    }

    /// Constructs a wrapper and connects it in one step.
    pub fn establish(config: ConnectionConfig) -> Result<Self> {
        let mut conn = Connection::new(config);
        conn.connect()?;
        Ok(conn)
    }

    /// Builds the DSN from the config and acquires the live handle for
    /// it, creating one through the driver if the registry has none.
    ///
    /// For file-based databases the parent directory of the database
    /// file is created (including intermediate directories) before
    /// connecting; the operation is idempotent. The first successful
    /// connect over the registry's lifetime also introspects the
    /// [`Schema`]. Returns whether the handle is live.
    pub fn connect(&mut self) -> Result<bool> {
        let dsn = self.config.dsn()?;

        if self.config.driver == Driver::Sqlite {
            if let Some(parent) = self.config.database_file().parent() {
                fs::create_dir_all(parent)?;
            }
        }

        let config = self.config.clone();
        let factory_dsn = dsn.clone();
        let handle = self
            .registry
            .acquire(&dsn, || open_native(&config, &factory_dsn))?;
        self.fingerprint = Some(dsn.clone());

        if !self.registry.is_live(&dsn) {
            return Err(ReliteError::NullHandle(dsn));
        }

        self.registry.ensure_schema(&handle)?;
        debug!(dsn = %dsn, "database connection ready");
        Ok(self.is_connected())
    }

    /// True iff the registry currently has a live handle for this
    /// wrapper's fingerprint.
    pub fn is_connected(&self) -> bool {
        match &self.fingerprint {
            Some(fingerprint) => self.registry.is_live(fingerprint),
            None => false,
        }
    }

    /// Releases the registry entry for this fingerprint. Subsequent
    /// `is_connected()` is false until `connect()` is called again.
    pub fn close(&mut self) {
        if let Some(fingerprint) = self.fingerprint.take() {
            self.registry.release(&fingerprint);
        }
    }

    fn handle(&self) -> Option<Handle> {
        self.registry.handle(self.fingerprint.as_deref()?)
    }

    /// Executes `sql` immediately and returns the resulting rows.
    /// A disconnected wrapper returns an empty result instead of
    /// failing.
    pub fn raw_query(&self, sql: &str) -> Result<Vec<Record>> {
        match self.prepare(sql) {
            Some(stmt) => stmt.query(&[]),
            None => Ok(Vec::new()),
        }
    }

    /// Returns a prepared statement for `sql`, or `None` when not
    /// connected. Never fails; preparation against the driver is
    /// deferred to execution, where the handle can be locked.
    pub fn prepare(&self, sql: &str) -> Option<Prepared> {
        let handle = self.handle()?;
        Some(Prepared {
            handle,
            sql: sql.to_string(),
        })
    }

    /// Runs a statement through the prepared path and returns the
    /// affected-row count. Fails when not connected.
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        match self.prepare(sql) {
            Some(stmt) => stmt.execute(params),
            None => Err(ReliteError::Query(
                "not connected to a database".to_string(),
            )),
        }
    }

    /// Runs a query through the prepared path and returns its rows.
    /// Fails when not connected.
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Record>> {
        match self.prepare(sql) {
            Some(stmt) => stmt.query(params),
            None => Err(ReliteError::Query(
                "not connected to a database".to_string(),
            )),
        }
    }

    /// Returns `raw` as an escaped SQL string literal.
    ///
    /// A disconnected wrapper returns the value unchanged, which is NOT
    /// safe to splice into SQL; callers must treat that result as
    /// untrusted input.
    pub fn quote(&self, raw: &str) -> String {
        if self.is_connected() {
            format!("'{}'", raw.replace('\'', "''"))
        } else {
            raw.to_string()
        }
    }

    /// Row id generated by the most recent successful insert on this
    /// handle, or -1 when not connected.
    pub fn last_insert_id(&self) -> i64 {
        match self.handle() {
            Some(handle) => handle
                .lock()
                .map(|conn| conn.last_insert_rowid())
                .unwrap_or(-1),
            None => -1,
        }
    }

    /// The registry-wide schema, if it has been introspected.
    pub fn schema(&self) -> Option<Arc<Schema>> {
        self.registry.schema()
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("driver", &self.config.driver)
            .field("fingerprint", &self.fingerprint)
            .field("connected", &self.is_connected())
            .finish()
    }
}

fn open_native(config: &ConnectionConfig, dsn: &str) -> Result<rusqlite::Connection> {
    match config.driver {
        Driver::Sqlite => rusqlite::Connection::open(config.database_file()).map_err(|e| {
            ReliteError::Connection {
                message: e.to_string(),
                dsn: dsn.to_string(),
            }
        }),
        Driver::Mysql => Err(ReliteError::Connection {
            message: "mysql driver is not available in this build".to_string(),
            dsn: dsn.to_string(),
        }),
    }
}

/// A statement bound to a live handle, executed with positional
/// parameters. Values are always bound through the driver, never
/// interpolated into the SQL text.
pub struct Prepared {
    handle: Handle,
    sql: String,
}

impl Prepared {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Executes the statement and returns the affected-row count.
    pub fn execute(&self, params: &[Value]) -> Result<usize> {
        debug!(sql = %self.sql, "executing statement");
        let guard = self
            .handle
            .lock()
            .map_err(|_| ReliteError::App("database handle lock poisoned".to_string()))?;
        let mut stmt = guard.prepare(&self.sql)?;
        let affected = stmt.execute(rusqlite::params_from_iter(params.iter()))?;
        Ok(affected)
    }

    /// Executes the statement and materializes every row into a
    /// [`Record`].
    pub fn query(&self, params: &[Value]) -> Result<Vec<Record>> {
        debug!(sql = %self.sql, "executing query");
        let guard = self
            .handle
            .lock()
            .map_err(|_| ReliteError::App("database handle lock poisoned".to_string()))?;
        let mut stmt = guard.prepare(&self.sql)?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params.iter()), |row| {
                Record::from_row(row, &columns)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
