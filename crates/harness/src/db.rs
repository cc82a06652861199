//! Database verification helper
//!
//! Thin wrapper over an embedded SQLite connection, used by tests to check
//! backend state after UI flows. Rows come back as JSON objects keyed by
//! column name so assertions read naturally next to test data.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, ToSql};
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::error::{HarnessError, HarnessResult};

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> HarnessResult<Self> {
        debug!(path = %path.display(), "opening database");
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    pub fn open_in_memory() -> HarnessResult<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Run a statement, returning the number of affected rows
    pub fn execute(&self, sql: &str, params: &[&dyn ToSql]) -> HarnessResult<usize> {
        debug!(sql, "executing statement");
        Ok(self.conn.execute(sql, params)?)
    }

    /// Run a query, returning every row as a JSON object
    pub fn query(&self, sql: &str, params: &[&dyn ToSql]) -> HarnessResult<Vec<Map<String, Value>>> {
        debug!(sql, "running query");
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let mut rows = stmt.query(params)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut object = Map::new();
            for (i, column) in columns.iter().enumerate() {
                object.insert(column.clone(), json_value(row.get_ref(i)?));
            }
            out.push(object);
        }
        Ok(out)
    }

    /// Run a query expected to match exactly one row
    pub fn fetch_one(&self, sql: &str, params: &[&dyn ToSql]) -> HarnessResult<Map<String, Value>> {
        let mut rows = self.query(sql, params)?;
        match rows.len() {
            1 => Ok(rows.remove(0)),
            n => Err(HarnessError::Config(format!(
                "query expected one row, got {}: {}",
                n, sql
            ))),
        }
    }
}

fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(format!("<blob {} bytes>", b.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.execute(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT, active INTEGER)",
            &[],
        )
        .unwrap();
        db.execute(
            "INSERT INTO users (email, active) VALUES ('a@example.com', 1), ('b@example.com', 0)",
            &[],
        )
        .unwrap();
        db
    }

    #[test]
    fn query_returns_rows_as_json_objects() {
        let db = seeded();
        let rows = db
            .query("SELECT email, active FROM users ORDER BY id", &[])
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["email"], json!("a@example.com"));
        assert_eq!(rows[0]["active"], json!(1));
    }

    #[test]
    fn fetch_one_enforces_exactly_one_row() {
        let db = seeded();
        let row = db
            .fetch_one("SELECT * FROM users WHERE email = ?1", &[&"a@example.com"])
            .unwrap();
        assert_eq!(row["active"], json!(1));

        assert!(db.fetch_one("SELECT * FROM users", &[]).is_err());
        assert!(db
            .fetch_one("SELECT * FROM users WHERE email = 'none'", &[])
            .is_err());
    }
}
