//! Embedded local store
//!
//! One SQLite database under `~/.teq/` holds the catalog (connections, items,
//! query definitions), saved column configuration, and session instances.
//! The store is opened once at startup and passed by reference into whatever
//! needs it; there is no global handle.
//!
//! The database is shared only across separate process invocations. Writes
//! are INSERT OR REPLACE upserts, so concurrent processes touching the same
//! composite key race under last-writer-wins.

use crate::error::TeqError;
use rusqlite::Connection;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_millis(5_000);

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS connections(
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    driver  TEXT NOT NULL,
    name    TEXT UNIQUE,
    connect TEXT,
    comment TEXT
);

CREATE TABLE IF NOT EXISTS items(
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    connection_id INTEGER,
    name          TEXT,
    FOREIGN KEY (connection_id) REFERENCES connections(id)
);

CREATE TABLE IF NOT EXISTS queries(
    id          INTEGER PRIMARY KEY,
    item_id     INTEGER,
    name        TEXT UNIQUE,
    query_text  TEXT,
    config_json TEXT,
    height      INTEGER DEFAULT 10,
    FOREIGN KEY (item_id) REFERENCES items(id)
);

CREATE TABLE IF NOT EXISTS column_config(
    item_id  INTEGER,
    token    TEXT,
    variable TEXT,
    value    TEXT,
    PRIMARY KEY (item_id, token, variable),
    FOREIGN KEY (item_id) REFERENCES items(id)
);

CREATE TABLE IF NOT EXISTS session_instance(
    token       TEXT,
    query_id    INTEGER,
    row_digest  CHAR(64),
    filter_text TEXT,
    PRIMARY KEY (token, query_id),
    FOREIGN KEY (query_id) REFERENCES queries(id)
);

-- Token allocation is a store-level responsibility: rows inserted without a
-- token get a fresh grouped-hex one backfilled.
CREATE TRIGGER IF NOT EXISTS session_instance_token_backfill
AFTER INSERT ON session_instance
FOR EACH ROW
WHEN NEW.token IS NULL
BEGIN
    UPDATE session_instance SET token = (
        SELECT LOWER(
            SUBSTR(hex, 1, 8) || '-' ||
            SUBSTR(hex, 9, 4) || '-' ||
            SUBSTR(hex, 13, 4) || '-' ||
            SUBSTR(hex, 17, 4) || '-' ||
            SUBSTR(hex, 21, 12)
        )
        FROM (SELECT HEX(RANDOMBLOB(16)) AS hex)
    )
    WHERE rowid = NEW.rowid;
END;
";

/// Handle to the embedded local store
pub struct Store {
    pub(crate) conn: Connection,
}

impl Store {
    /// Resolve the store directory (`~/.teq`), creating it if needed
    pub fn store_dir() -> Result<PathBuf, TeqError> {
        let home = env::var("HOME")
            .map_err(|_| TeqError::NotFound("HOME environment variable".to_string()))?;
        let dir = PathBuf::from(home).join(".teq");
        fs::create_dir_all(&dir)
            .map_err(|e| TeqError::Connection(format!("create {}: {}", dir.display(), e)))?;
        Ok(dir)
    }

    /// Open the default store at `~/.teq/teq.db`
    pub fn open_default() -> Result<Self, TeqError> {
        let path = Self::store_dir()?.join("teq.db");
        Self::open(&path)
    }

    /// Open (and initialize) the store at an explicit path
    pub fn open(path: &Path) -> Result<Self, TeqError> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// In-memory store, used by tests
    pub fn open_in_memory() -> Result<Self, TeqError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, TeqError> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}
