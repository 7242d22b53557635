//! Schema introspection module.
//!
//! Builds a snapshot of the connected database's structure — tables,
//! columns and foreign keys — through SQLite's PRAGMA interface. The
//! snapshot is taken once per registry lifetime, on the first successful
//! connect, and shared read-only afterwards.

use crate::core::Result;
use rusqlite::Connection;
use std::collections::HashMap;

/// A database column with the metadata the model layer cares about.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    /// Declared type name (e.g. "INTEGER", "TEXT")
    pub type_name: String,
    pub notnull: bool,
    /// Whether this column is part of the primary key
    pub pk: bool,
    /// Default value expression, if any
    pub default: Option<String>,
}

/// A foreign key relationship from one table into another.
#[derive(Debug, Clone)]
pub struct ForeignKey {
    /// The referenced table
    pub table: String,
    /// The referencing column in this table
    pub from: String,
    /// The referenced column in the foreign table
    pub to: String,
}

/// One table's structure.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    fn introspect(conn: &Connection, name: &str) -> Result<Self> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info('{}')", name))?;
        let columns = stmt
            .query_map([], |row| {
                Ok(Column {
                    name: row.get(1)?,
                    type_name: row.get(2)?,
                    notnull: row.get(3)?,
                    default: row.get(4)?,
                    pk: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(&format!("PRAGMA foreign_key_list('{}')", name))?;
        let foreign_keys = stmt
            .query_map([], |row| {
                Ok(ForeignKey {
                    table: row.get(2)?,
                    from: row.get(3)?,
                    to: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Table {
            name: name.to_string(),
            columns,
            foreign_keys,
        })
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The first primary-key column, if the table declares one.
    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.pk)
    }
}

/// Structure of every user-defined table in the database.
#[derive(Debug, Clone)]
pub struct Schema {
    tables: HashMap<String, Table>,
}

impl Schema {
    /// Introspects all user tables reachable through `conn`.
    pub fn from_connection(conn: &Connection) -> Result<Self> {
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut tables = HashMap::new();
        for name in names {
            tables.insert(name.clone(), Table::introspect(conn, &name)?);
        }

        Ok(Schema { tables })
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Table names in sorted order.
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_schema(conn: &Connection) {
        conn.execute_batch(
            "
            CREATE TABLE users (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT,
                age INTEGER DEFAULT 0
            );
            CREATE TABLE posts (
                id INTEGER PRIMARY KEY,
                user_id INTEGER,
                title TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id)
            );
        ",
        )
        .unwrap();
    }

    #[test]
    fn test_schema_introspection() {
        let conn = Connection::open_in_memory().unwrap();
        setup_test_schema(&conn);

        let schema = Schema::from_connection(&conn).unwrap();
        assert_eq!(schema.table_names(), vec!["posts", "users"]);

        let users = schema.table("users").unwrap();
        assert_eq!(users.columns.len(), 4);

        let id = users.column("id").unwrap();
        assert!(id.pk);
        assert_eq!(id.type_name, "INTEGER");

        let name = users.column("name").unwrap();
        assert!(name.notnull);
        assert!(!name.pk);

        let age = users.column("age").unwrap();
        assert_eq!(age.default.as_deref(), Some("0"));
    }

    #[test]
    fn test_primary_key_lookup() {
        let conn = Connection::open_in_memory().unwrap();
        setup_test_schema(&conn);

        let schema = Schema::from_connection(&conn).unwrap();
        let users = schema.table("users").unwrap();
        assert_eq!(users.primary_key().unwrap().name, "id");
    }

    #[test]
    fn test_foreign_keys() {
        let conn = Connection::open_in_memory().unwrap();
        setup_test_schema(&conn);

        let schema = Schema::from_connection(&conn).unwrap();
        let posts = schema.table("posts").unwrap();

        assert_eq!(posts.foreign_keys.len(), 1);
        let fk = &posts.foreign_keys[0];
        assert_eq!(fk.table, "users");
        assert_eq!(fk.from, "user_id");
        assert_eq!(fk.to, "id");
    }

    #[test]
    fn test_empty_database() {
        let conn = Connection::open_in_memory().unwrap();
        let schema = Schema::from_connection(&conn).unwrap();
        assert!(schema.is_empty());
        assert!(schema.table("missing").is_none());
    }
}
