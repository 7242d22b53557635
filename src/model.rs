//! Active-record model layer.
//!
//! `Model` is a capability trait: a concrete entity type describes how
//! it maps to and from an attribute bag, and where its rows live —
//! table, primary key and connection name — with convention-based
//! defaults a type overrides by reimplementing the method. Everything
//! else (CRUD, relations) is provided on top of the query builders.

use crate::config;
use crate::core::db::Connection;
use crate::core::{ReliteError, Result};
use crate::naming;
use crate::record::{FromRecord, Record};
use crate::sql::{DeleteQuery, InsertQuery, SelectQuery, UpdateQuery, Value};

/// An active-record entity backed by one table row.
///
/// Required: the attribute-bag mapping (`to_record`, plus `from_record`
/// through the [`FromRecord`] supertrait) and `set_primary_key` for the
/// insert-path back-fill. The resolution methods default to convention:
/// snake_case type name, `id`, `default`.
pub trait Model: FromRecord {
    /// Table backing this type. Convention: the snake_case form of the
    /// type's name.
    fn table_name() -> String {
        naming::table_name_of::<Self>()
    }

    /// Primary key column. Convention: `id`.
    fn primary_key() -> &'static str {
        "id"
    }

    /// Logical connection name resolved through the installed
    /// configuration. Convention: `default`.
    fn connection_name() -> &'static str {
        "default"
    }

    /// The attribute bag for this instance. The primary key must appear
    /// here iff it has a value; its presence selects the update path in
    /// [`save`](Self::save).
    fn to_record(&self) -> Record;

    /// Back-fills the generated key after an insert-path save.
    fn set_primary_key(&mut self, id: i64);

    /// A connected wrapper for this type's configured connection.
    fn connection() -> Result<Connection> {
        let config = config::connection(Self::connection_name())?;
        Connection::establish(config)
    }

    /// A SELECT over this type's table, mapping rows into `Self`.
    fn query() -> Result<SelectQuery<Self>> {
        Ok(SelectQuery::new(Self::table_name(), Self::connection()?))
    }

    /// Every row of the table.
    fn all() -> Result<Vec<Self>> {
        Self::query()?.get()
    }

    /// The row whose primary key equals `id`, or `None`.
    fn find(id: i64) -> Result<Option<Self>> {
        Self::query()?.where_eq(Self::primary_key(), id).first()
    }

    /// A SELECT restricted to the given columns.
    fn select<I, S>(fields: I) -> Result<SelectQuery<Self>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::query()?.select(fields))
    }

    /// A SELECT filtered by equality.
    fn where_eq(column: impl Into<String>, value: impl Into<Value>) -> Result<SelectQuery<Self>> {
        Ok(Self::query()?.where_eq(column, value))
    }

    /// A SELECT filtered with an explicit operator.
    fn where_op(
        column: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<SelectQuery<Self>> {
        Ok(Self::query()?.where_op(column, op, value))
    }

    /// A SELECT filtered by set membership.
    fn where_in<I>(column: impl Into<String>, values: I) -> Result<SelectQuery<Self>>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Ok(Self::query()?.where_in(column, values))
    }

    /// Persists this instance: the update path when the primary key is
    /// present in the attribute bag, the insert path otherwise. An
    /// insert back-fills the generated key and returns it; an update
    /// returns the affected-row count.
    fn save(&mut self) -> Result<i64> {
        let record = self.to_record();
        let pk = Self::primary_key();

        if let Some(id_value) = record.get(pk) {
            let affected = UpdateQuery::new(Self::table_name(), Self::connection()?)
                .set_all(&record)
                .where_eq(pk, id_value.clone())
                .execute()?;
            Ok(affected as i64)
        } else {
            let id = InsertQuery::new(Self::table_name(), Self::connection()?)
                .set_all(&record)
                .execute()?;
            if id > 0 {
                self.set_primary_key(id);
            }
            Ok(id)
        }
    }

    /// Deletes this instance's row. A record without its primary key is
    /// a no-op returning the sentinel `-1`; otherwise the affected-row
    /// count.
    fn delete(&self) -> Result<i64> {
        let record = self.to_record();
        let pk = Self::primary_key();

        let Some(id_value) = record.get(pk) else {
            return Ok(-1);
        };

        let affected = DeleteQuery::new(Self::table_name(), Self::connection()?)
            .where_eq(pk, id_value.clone())
            .execute()?;
        Ok(affected as i64)
    }

    /// Rows of `R` whose foreign key references this row. The foreign
    /// key defaults to `<own-table>_id`.
    fn has_many<R: Model>(&self, foreign_key: Option<&str>) -> Result<Vec<R>> {
        let record = self.to_record();
        let pk = Self::primary_key();
        let id_value = record.get(pk).cloned().ok_or_else(|| {
            ReliteError::Relation(format!("record has no value for primary key '{}'", pk))
        })?;

        let fk = foreign_key
            .map(String::from)
            .unwrap_or_else(|| format!("{}_id", Self::table_name()));
        R::where_op(fk.as_str(), "=", id_value)?.get()
    }

    /// The single row of `R` whose foreign key references this row, if
    /// any. `local_key` overrides which of this record's attributes is
    /// matched (the primary key by default).
    fn has_one<R: Model>(
        &self,
        foreign_key: Option<&str>,
        local_key: Option<&str>,
    ) -> Result<Option<R>> {
        let record = self.to_record();
        let key = local_key.unwrap_or(Self::primary_key());
        let id_value = record.get(key).cloned().ok_or_else(|| {
            ReliteError::Relation(format!("record has no value for key '{}'", key))
        })?;

        let fk = foreign_key
            .map(String::from)
            .unwrap_or_else(|| format!("{}_id", Self::table_name()));
        R::where_op(fk.as_str(), "=", id_value)?.first()
    }

    /// The row of `R` this record's foreign-key attribute points at, if
    /// any.
    fn belongs_to<R: Model>(&self, foreign_key: Option<&str>) -> Result<Option<R>> {
        let record = self.to_record();
        let fk = foreign_key
            .map(String::from)
            .unwrap_or_else(|| format!("{}_id", Self::table_name()));
        let id_value = record.get(&fk).cloned().ok_or_else(|| {
            ReliteError::Relation(format!("record has no value for foreign key '{}'", fk))
        })?;

        R::where_op("id", "=", id_value)?.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct BlogPost {
        id: Option<i64>,
        title: String,
    }

    impl FromRecord for BlogPost {
        fn from_record(record: Record) -> Result<Self> {
            Ok(BlogPost {
                id: record.i64("id"),
                title: record.text("title").unwrap_or_default().to_string(),
            })
        }
    }

    impl Model for BlogPost {
        fn to_record(&self) -> Record {
            let mut record = Record::new();
            if let Some(id) = self.id {
                record.set("id", id);
            }
            record.set("title", self.title.as_str());
            record
        }

        fn set_primary_key(&mut self, id: i64) {
            self.id = Some(id);
        }

        fn connection_name() -> &'static str {
            "model_test_unconfigured"
        }
    }

    #[test]
    fn test_convention_defaults() {
        assert_eq!(BlogPost::table_name(), "blog_post");
        assert_eq!(BlogPost::primary_key(), "id");
    }

    #[test]
    fn test_primary_key_presence_tracked_in_bag() {
        let post = BlogPost {
            id: None,
            title: "draft".to_string(),
        };
        assert!(!post.to_record().contains("id"));

        let post = BlogPost {
            id: Some(4),
            title: "draft".to_string(),
        };
        assert_eq!(post.to_record().i64("id"), Some(4));
    }

    #[test]
    fn test_delete_without_primary_key_is_a_sentinel_noop() {
        let post = BlogPost {
            id: None,
            title: "draft".to_string(),
        };
        // Returns -1 without touching configuration or a database
        assert_eq!(post.delete().unwrap(), -1);
    }

    #[test]
    fn test_unconfigured_connection_is_a_config_error() {
        let mut post = BlogPost {
            id: None,
            title: "draft".to_string(),
        };
        match post.save() {
            Err(ReliteError::Config(msg)) => {
                assert!(msg.contains("model_test_unconfigured"))
            }
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_relation_without_key_attribute_fails() {
        let post = BlogPost {
            id: None,
            title: "draft".to_string(),
        };
        match post.has_many::<BlogPost>(None) {
            Err(ReliteError::Relation(msg)) => assert!(msg.contains("id")),
            other => panic!("Expected Relation error, got {:?}", other.err()),
        }
    }
}
