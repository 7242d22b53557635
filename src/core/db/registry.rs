//! Connection registry.
//!
//! Maps a connection fingerprint (driver + DSN) to the single live native
//! handle for that fingerprint. Every `Connection` wrapper constructed
//! from an equal configuration shares the same underlying handle until it
//! is released. The registry is an explicitly owned value; a process-wide
//! instance backs the model layer, and callers that want isolation (tests
//! do) construct their own.

use crate::core::db::schema::Schema;
use crate::core::{ReliteError, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// A live native connection, shareable between wrappers.
pub type Handle = Arc<Mutex<rusqlite::Connection>>;

static GLOBAL: Lazy<Arc<ConnectionRegistry>> = Lazy::new(|| Arc::new(ConnectionRegistry::new()));

/// Registry of live database handles keyed by fingerprint.
///
/// Invariant: at most one live handle per fingerprint. The map lock is
/// held across the check-then-create in [`acquire`](Self::acquire), so two
/// callers racing on the same fingerprint cannot both invoke the factory.
///
/// The registry also owns the lazily-built [`Schema`], constructed once
/// from the first successful connect over its lifetime.
pub struct ConnectionRegistry {
    handles: Mutex<HashMap<String, Handle>>,
    schema: Mutex<Option<Arc<Schema>>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        ConnectionRegistry {
            handles: Mutex::new(HashMap::new()),
            schema: Mutex::new(None),
        }
    }

    /// Returns the process-wide registry instance.
    pub fn global() -> Arc<ConnectionRegistry> {
        GLOBAL.clone()
    }

    /// Returns the existing live handle for `fingerprint`, or invokes
    /// `factory` to create one, stores it and returns it.
    ///
    /// A factory failure leaves no entry behind; the error propagates to
    /// the caller unchanged.
    pub fn acquire<F>(&self, fingerprint: &str, factory: F) -> Result<Handle>
    where
        F: FnOnce() -> Result<rusqlite::Connection>,
    {
        let mut handles = self
            .handles
            .lock()
            .map_err(|_| ReliteError::App("connection registry lock poisoned".to_string()))?;

        if let Some(handle) = handles.get(fingerprint) {
            return Ok(handle.clone());
        }

        let conn = factory()?;
        let handle = Arc::new(Mutex::new(conn));
        handles.insert(fingerprint.to_string(), handle.clone());
        debug!(fingerprint, "opened new database handle");
        Ok(handle)
    }

    /// Removes and invalidates the entry for `fingerprint`. The native
    /// connection closes when the last wrapper drops its handle.
    pub fn release(&self, fingerprint: &str) {
        if let Ok(mut handles) = self.handles.lock() {
            if handles.remove(fingerprint).is_some() {
                debug!(fingerprint, "released database handle");
            }
        }
    }

    /// True iff the registry currently holds a live handle for
    /// `fingerprint`.
    pub fn is_live(&self, fingerprint: &str) -> bool {
        self.handles
            .lock()
            .map(|handles| handles.contains_key(fingerprint))
            .unwrap_or(false)
    }

    /// Returns the live handle for `fingerprint`, if any.
    pub fn handle(&self, fingerprint: &str) -> Option<Handle> {
        self.handles.lock().ok()?.get(fingerprint).cloned()
    }

    /// Returns the schema if it has been built already.
    pub fn schema(&self) -> Option<Arc<Schema>> {
        self.schema.lock().ok()?.clone()
    }

    /// Returns the schema, introspecting it from `handle` on the first
    /// call over this registry's lifetime.
    pub(crate) fn ensure_schema(&self, handle: &Handle) -> Result<Arc<Schema>> {
        let mut cell = self
            .schema
            .lock()
            .map_err(|_| ReliteError::App("schema lock poisoned".to_string()))?;

        if let Some(schema) = cell.as_ref() {
            return Ok(schema.clone());
        }

        let guard = handle
            .lock()
            .map_err(|_| ReliteError::App("database handle lock poisoned".to_string()))?;
        let schema = Arc::new(Schema::from_connection(&guard)?);
        *cell = Some(schema.clone());
        debug!("database schema introspected");
        Ok(schema)
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        ConnectionRegistry::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_memory() -> Result<rusqlite::Connection> {
        Ok(rusqlite::Connection::open_in_memory()?)
    }

    #[test]
    fn test_acquire_is_idempotent() {
        let registry = ConnectionRegistry::new();

        let first = registry.acquire("sqlite:test.db", open_memory).unwrap();
        let second = registry
            .acquire("sqlite:test.db", || panic!("factory must not run twice"))
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(registry.is_live("sqlite:test.db"));
    }

    #[test]
    fn test_release_invalidates_entry() {
        let registry = ConnectionRegistry::new();
        registry.acquire("sqlite:test.db", open_memory).unwrap();

        registry.release("sqlite:test.db");
        assert!(!registry.is_live("sqlite:test.db"));
        assert!(registry.handle("sqlite:test.db").is_none());

        // A released fingerprint can be acquired again
        registry.acquire("sqlite:test.db", open_memory).unwrap();
        assert!(registry.is_live("sqlite:test.db"));
    }

    #[test]
    fn test_factory_failure_stores_nothing() {
        let registry = ConnectionRegistry::new();

        let result = registry.acquire("sqlite:broken.db", || {
            Err(ReliteError::Connection {
                message: "unable to open database file".to_string(),
                dsn: "sqlite:broken.db".to_string(),
            })
        });

        assert!(result.is_err());
        assert!(!registry.is_live("sqlite:broken.db"));

        // The failed attempt left no entry, so a retry runs the factory
        registry.acquire("sqlite:broken.db", open_memory).unwrap();
        assert!(registry.is_live("sqlite:broken.db"));
    }

    #[test]
    fn test_distinct_fingerprints_get_distinct_handles() {
        let registry = ConnectionRegistry::new();

        let a = registry.acquire("sqlite:a.db", open_memory).unwrap();
        let b = registry.acquire("sqlite:b.db", open_memory).unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_schema_built_once() {
        let registry = ConnectionRegistry::new();
        let handle = registry.acquire("sqlite:schema.db", open_memory).unwrap();

        {
            let guard = handle.lock().unwrap();
            guard
                .execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)", [])
                .unwrap();
        }

        assert!(registry.schema().is_none());
        let schema = registry.ensure_schema(&handle).unwrap();
        assert!(schema.table("users").is_some());

        // Later tables are invisible: the snapshot is taken once
        {
            let guard = handle.lock().unwrap();
            guard
                .execute("CREATE TABLE posts (id INTEGER PRIMARY KEY)", [])
                .unwrap();
        }
        let again = registry.ensure_schema(&handle).unwrap();
        assert!(Arc::ptr_eq(&schema, &again));
        assert!(again.table("posts").is_none());
    }
}
