//! SQLite backend (rusqlite)

use crate::db::Backend;
use crate::error::TeqError;
use crate::model::{Column, Grid};
use rusqlite::types::ValueRef;
use rusqlite::Connection;

/// Backend executing against a SQLite database file (or `:memory:`)
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    pub fn connect(connect_str: &str) -> Result<Box<dyn Backend>, TeqError> {
        let conn = Connection::open(connect_str)
            .map_err(|e| TeqError::Connection(format!("sqlite '{}': {}", connect_str, e)))?;
        Ok(Box::new(Self { conn }))
    }
}

impl Backend for SqliteBackend {
    fn execute(&mut self, sql: &str) -> Result<Grid, TeqError> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| TeqError::Query(e.to_string()))?;

        let columns: Vec<Column> = stmt
            .column_names()
            .iter()
            .map(|name| Column::new(name.to_uppercase()))
            .collect();
        let column_count = columns.len();

        let mut out = Vec::new();
        let mut rows = stmt.query([]).map_err(|e| TeqError::Query(e.to_string()))?;
        while let Some(row) = rows.next().map_err(|e| TeqError::Query(e.to_string()))? {
            let mut cells = Vec::with_capacity(column_count);
            for i in 0..column_count {
                let value = row
                    .get_ref(i)
                    .map_err(|e| TeqError::Query(e.to_string()))?;
                cells.push(render_value(value));
            }
            out.push(cells);
        }

        Ok(Grid {
            columns,
            rows: out,
        })
    }
}

/// Normalize a SQLite value into its display string
fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(text) => String::from_utf8_lossy(text).into_owned(),
        ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}
