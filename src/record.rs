//! The attribute bag backing every row and entity.
//!
//! A `Record` is an ordered mapping from column name to [`Value`].
//! Insertion order is preserved; setting an existing column overwrites
//! its value in place. Values round-trip exactly as the driver returned
//! them.

use crate::core::{ReliteError, Result};
use crate::sql::Value;
use rusqlite::Row;

/// One row's worth of column/value pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Record { fields: Vec::new() }
    }

    /// Stages `value` under `column`. An existing column keeps its
    /// position and gets the new value; a new column is appended.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Integer accessor; `None` when absent or a different type.
    pub fn i64(&self, column: &str) -> Option<i64> {
        self.get(column)?.as_i64()
    }

    pub fn real(&self, column: &str) -> Option<f64> {
        self.get(column)?.as_f64()
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column)?.as_str()
    }

    pub fn blob(&self, column: &str) -> Option<&[u8]> {
        self.get(column)?.as_blob()
    }

    /// Builds a record from a driver row, in column order.
    pub fn from_row(row: &Row, columns: &[String]) -> rusqlite::Result<Record> {
        let mut record = Record::new();
        for (i, column) in columns.iter().enumerate() {
            record.set(column.as_str(), Value::from(row.get_ref(i)?));
        }
        Ok(record)
    }

    /// Converts the record into a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(c, v)| (c.clone(), v.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }

    /// Builds a record from a JSON object of scalar values.
    pub fn from_json(json: &serde_json::Value) -> Result<Record> {
        let object = json
            .as_object()
            .ok_or_else(|| ReliteError::Query("expected a JSON object".to_string()))?;

        let mut record = Record::new();
        for (column, value) in object {
            let value = match value {
                serde_json::Value::Null => Value::Null,
                serde_json::Value::Bool(b) => Value::from(*b),
                serde_json::Value::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        Value::Integer(i)
                    } else if let Some(f) = n.as_f64() {
                        Value::Real(f)
                    } else {
                        return Err(ReliteError::Query(format!(
                            "unsupported number for column '{}'",
                            column
                        )));
                    }
                }
                serde_json::Value::String(s) => Value::Text(s.clone()),
                _ => {
                    return Err(ReliteError::Query(format!(
                        "unsupported JSON value for column '{}'",
                        column
                    )))
                }
            };
            record.set(column.as_str(), value);
        }
        Ok(record)
    }
}

/// Mapping from a raw row into a concrete result type. `Record` maps to
/// itself; entity types implement this to become query results.
pub trait FromRecord: Sized {
    fn from_record(record: Record) -> Result<Self>;
}

impl FromRecord for Record {
    fn from_record(record: Record) -> Result<Self> {
        Ok(record)
    }
}
