//! Catalog store - named connections, items, and query definitions
//!
//! The catalog is provisioned out-of-band (administrative inserts) and read
//! by name here. Items and column-config rows are the exception: they are
//! created lazily the first time a user saves configuration for an item.

use crate::error::TeqError;
use crate::model::grid::Column;
use crate::model::DisplayConfig;
use crate::services::store::Store;
use rusqlite::{params, OptionalExtension};
use std::collections::HashMap;

/// A registered database connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub id: i64,
    pub driver: String,
    pub connect: String,
}

/// A named query definition (display config is fetched separately)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDef {
    pub id: i64,
    pub text: String,
}

impl Store {
    /// Look up a connection by its unique name
    pub fn connection_by_name(&self, name: &str) -> Result<ConnectionInfo, TeqError> {
        self.conn
            .query_row(
                "SELECT id, driver, connect FROM connections WHERE name = ?1",
                [name],
                |row| {
                    Ok(ConnectionInfo {
                        id: row.get(0)?,
                        driver: row.get(1)?,
                        connect: row.get(2)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| TeqError::NotFound(format!("connection '{}'", name)))
    }

    /// Look up a query definition by its unique name
    pub fn query_by_name(&self, name: &str) -> Result<QueryDef, TeqError> {
        self.conn
            .query_row(
                "SELECT id, query_text FROM queries WHERE name = ?1",
                [name],
                |row| {
                    Ok(QueryDef {
                        id: row.get(0)?,
                        text: row.get(1)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| TeqError::NotFound(format!("query '{}'", name)))
    }

    /// Fetch and parse the display config stored with a query definition.
    ///
    /// An absent or empty `config_json` yields empty maps and the row's
    /// stored height; malformed JSON is a hard `ConfigParse` error.
    pub fn query_display_config(&self, name: &str) -> Result<DisplayConfig, TeqError> {
        let (config_json, height): (Option<String>, u16) = self
            .conn
            .query_row(
                "SELECT config_json, COALESCE(height, 10) FROM queries WHERE name = ?1",
                [name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?
            .ok_or_else(|| TeqError::NotFound(format!("query '{}'", name)))?;

        Ok(DisplayConfig::from_json(config_json.as_deref(), height)?)
    }

    /// Look up an item id by name
    pub fn item_id(&self, name: &str) -> Result<i64, TeqError> {
        self.conn
            .query_row("SELECT id FROM items WHERE name = ?1", [name], |row| {
                row.get(0)
            })
            .optional()?
            .ok_or_else(|| TeqError::NotFound(format!("item '{}'", name)))
    }

    /// Create the item if no item with that name exists, returning its id.
    ///
    /// Safe to call before inserting column-config rows so the foreign key
    /// is always valid.
    pub fn ensure_item(&self, name: &str, connection_id: i64) -> Result<i64, TeqError> {
        self.conn.execute(
            "INSERT INTO items (name, connection_id)
             SELECT ?1, ?2
             WHERE NOT EXISTS (SELECT 1 FROM items WHERE name = ?1)",
            params![name, connection_id],
        )?;
        self.item_id(name)
    }

    /// Persist the selected row's cells as column config for an item.
    ///
    /// Only columns whose upper-cased title has a configured alias are saved,
    /// one upserted row per (item, token, alias). Variable names therefore
    /// compare case-insensitively with the physical column names.
    pub fn save_column_config(
        &self,
        item_name: &str,
        connection_id: i64,
        token: &str,
        row: &[String],
        columns: &[Column],
        aliases: &HashMap<String, String>,
    ) -> Result<(), TeqError> {
        let item_id = self.ensure_item(item_name, connection_id)?;

        for (i, column) in columns.iter().enumerate() {
            if i >= row.len() {
                break;
            }
            let title = column.title.to_uppercase();
            if let Some(variable) = aliases.get(&title) {
                self.conn.execute(
                    "INSERT OR REPLACE INTO column_config (item_id, token, variable, value)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![item_id, token, variable, row[i]],
                )?;
            }
        }
        Ok(())
    }
}
