//! SQLite executor: rows come back as JSON objects keyed by column name.

use gridsql::{Executor, Value};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, OpenFlags, params_from_iter};
use serde_json::{Map, Value as JsonValue};
use std::path::Path;

#[derive(Debug)]
pub struct SqliteDb {
    conn: Connection,
}

impl SqliteDb {
    /// Open `path` read-only.
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub const fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Int(n) => SqlValue::Integer(*n),
        Value::Float(f) => SqlValue::Real(*f),
        Value::String(s) => SqlValue::Text(s.clone()),
        // expanded before execution; kept total for completeness
        Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
    }
}

fn to_json(value: ValueRef<'_>) -> JsonValue {
    match value {
        ValueRef::Null => JsonValue::Null,
        ValueRef::Integer(n) => JsonValue::from(n),
        ValueRef::Real(f) => JsonValue::from(f),
        ValueRef::Text(t) => JsonValue::from(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => JsonValue::from(b.to_vec()),
    }
}

impl Executor for SqliteDb {
    type Row = JsonValue;
    type Error = rusqlite::Error;

    fn query(&mut self, sql: &str, args: &[Value]) -> rusqlite::Result<Vec<JsonValue>> {
        let mut stmt = self.conn.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let rows = stmt.query_map(params_from_iter(args.iter().map(to_sql)), |row| {
            let mut object = Map::with_capacity(names.len());
            for (i, name) in names.iter().enumerate() {
                object.insert(name.clone(), to_json(row.get_ref(i)?));
            }
            Ok(JsonValue::Object(object))
        })?;
        rows.collect()
    }

    fn query_counts(&mut self, sql: &str, args: &[Value]) -> rusqlite::Result<Vec<i64>> {
        let mut stmt = self.conn.prepare(sql)?;
        let counts = stmt.query_map(params_from_iter(args.iter().map(to_sql)), |row| row.get(0))?;
        counts.collect()
    }
}
