//! PostgreSQL backend
//!
//! Uses the simple-query protocol so every cell arrives already rendered as
//! text by the server, which matches the uniform string-cell shape without
//! per-type decoding.

use crate::db::Backend;
use crate::error::TeqError;
use crate::model::{Column, Grid};
use postgres::{Client, NoTls, SimpleQueryMessage};

/// Backend executing against a PostgreSQL server
pub struct PostgresBackend {
    client: Client,
}

impl PostgresBackend {
    pub fn connect(connect_str: &str) -> Result<Box<dyn Backend>, TeqError> {
        let client = Client::connect(connect_str, NoTls)
            .map_err(|e| TeqError::Connection(format!("postgres: {}", e)))?;
        Ok(Box::new(Self { client }))
    }
}

impl Backend for PostgresBackend {
    fn execute(&mut self, sql: &str) -> Result<Grid, TeqError> {
        let messages = self
            .client
            .simple_query(sql)
            .map_err(|e| TeqError::Query(e.to_string()))?;

        let mut columns: Vec<Column> = Vec::new();
        let mut rows = Vec::new();

        for message in messages {
            match message {
                SimpleQueryMessage::RowDescription(description) => {
                    if columns.is_empty() {
                        columns = description
                            .iter()
                            .map(|col| Column::new(col.name().to_uppercase()))
                            .collect();
                    }
                }
                SimpleQueryMessage::Row(row) => {
                    if columns.is_empty() {
                        columns = row
                            .columns()
                            .iter()
                            .map(|col| Column::new(col.name().to_uppercase()))
                            .collect();
                    }
                    // NULL arrives as None and renders as an empty string
                    let cells = (0..row.len())
                        .map(|i| row.get(i).unwrap_or("").to_string())
                        .collect();
                    rows.push(cells);
                }
                _ => {}
            }
        }

        Ok(Grid { columns, rows })
    }
}
