//! In-memory SQLite executor shared by the integration tests.

#![allow(dead_code)]

use gridsql::{Executor, Value};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, params_from_iter};

/// `SQLite` connection plus a log of every statement it ran.
pub struct SqliteDb {
    pub conn: Connection,
    pub statements: Vec<String>,
}

impl SqliteDb {
    /// A `people` table with a handful of rows.
    pub fn seeded() -> Self {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "create table people (
                id integer primary key,
                name text not null,
                team text,
                age integer,
                note text
            );
            insert into people (id, name, team, age, note) values
                (1, 'alice', 'core', 34, ''),
                (2, 'bob', 'core', 27, 'likes 50% off'),
                (3, 'carol', 'web', 41, null),
                (4, 'dave', 'web', 19, 'under_score'),
                (5, 'erin', null, 52, 'plain'),
                (6, 'alfred', 'ops', 23, '');",
        )
        .unwrap();
        Self {
            conn,
            statements: Vec::new(),
        }
    }
}

pub fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Int(n) => SqlValue::Integer(*n),
        Value::Float(f) => SqlValue::Real(*f),
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

impl Executor for SqliteDb {
    type Row = Vec<SqlValue>;
    type Error = rusqlite::Error;

    fn query(&mut self, sql: &str, args: &[Value]) -> Result<Vec<Self::Row>, Self::Error> {
        self.statements.push(sql.to_string());
        let mut stmt = self.conn.prepare(sql)?;
        let width = stmt.column_count();
        stmt.query_map(params_from_iter(args.iter().map(to_sql)), |row| {
            (0..width).map(|i| row.get::<_, SqlValue>(i)).collect()
        })?
        .collect()
    }

    fn query_counts(&mut self, sql: &str, args: &[Value]) -> Result<Vec<i64>, Self::Error> {
        self.statements.push(sql.to_string());
        let mut stmt = self.conn.prepare(sql)?;
        stmt.query_map(params_from_iter(args.iter().map(to_sql)), |row| row.get::<_, i64>(0))?
            .collect()
    }
}

/// First column of every row as an integer id.
pub fn ids(rows: &[Vec<SqlValue>]) -> Vec<i64> {
    rows.iter()
        .map(|row| match row.first() {
            Some(SqlValue::Integer(id)) => *id,
            other => panic!("expected integer id, got {other:?}"),
        })
        .collect()
}
